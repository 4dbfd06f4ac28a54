//! TCP front end speaking newline-delimited JSON.

use tandem_proto::{ClientMessage, CodecError, ServerMessage, read_message, write_message};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::service::RegistryHandle;

/// Accepts connections until `shutdown` fires, serving each on its own task.
pub async fn serve(listener: TcpListener, registry: RegistryHandle, shutdown: CancellationToken) -> std::io::Result<()> {
	info!(addr = %listener.local_addr()?, "server.listening");

	loop {
		tokio::select! {
			_ = shutdown.cancelled() => {
				info!("server.shutdown");
				break;
			}
			res = listener.accept() => {
				match res {
					Ok((stream, peer)) => {
						debug!(%peer, "server.accept");
						tokio::spawn(handle_connection(stream, registry.clone(), shutdown.clone()));
					}
					Err(e) => {
						error!(error = %e, "server.accept_failed");
					}
				}
			}
		}
	}

	Ok(())
}

async fn handle_connection(stream: TcpStream, registry: RegistryHandle, shutdown: CancellationToken) {
	let (read, mut write) = stream.into_split();
	let (outbox, mut outgoing) = mpsc::unbounded_channel::<ServerMessage>();

	let Ok(participant) = registry.connect(outbox.clone()).await else {
		return;
	};

	let writer = tokio::spawn(async move {
		while let Some(msg) = outgoing.recv().await {
			if let Err(e) = write_message(&mut write, &msg).await {
				debug!(%participant, error = %e, "server.write_failed");
				break;
			}
		}
	});

	let mut reader = BufReader::new(read);
	let mut buf = String::new();
	loop {
		let msg = tokio::select! {
			_ = shutdown.cancelled() => break,
			msg = read_message::<_, ClientMessage>(&mut reader, &mut buf) => msg,
		};
		match msg {
			Ok(Some(msg)) => {
				if registry.message(participant, msg).await.is_err() {
					break;
				}
			}
			Ok(None) => break,
			Err(CodecError::Json(e)) => {
				warn!(%participant, error = %e, "server.malformed_message");
				let _ = outbox.send(ServerMessage::Error {
					document: None,
					message: e.to_string(),
				});
			}
			Err(e @ CodecError::FrameTooLong { .. }) => {
				warn!(%participant, error = %e, "server.frame_too_long");
				let _ = outbox.send(ServerMessage::Error {
					document: None,
					message: e.to_string(),
				});
				break;
			}
			Err(CodecError::Io(e)) => {
				debug!(%participant, error = %e, "server.read_failed");
				break;
			}
		}
	}

	let _ = registry.disconnect(participant).await;
	drop(outbox);
	let _ = writer.await;
	debug!(%participant, "server.connection_closed");
}
