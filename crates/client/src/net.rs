//! Joining a document over TCP.

use tandem_proto::{ClientMessage, CodecError, DocumentId, ParticipantId, ServerMessage, read_message, write_message};
use tokio::io::BufReader;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::actor::{ClientActor, ClientHandle};
use crate::adapter::EditorAdapter;
use crate::config::ClientConfig;
use crate::editor_client::EditorClient;
use crate::error::{ClientError, Result};
use crate::transport::ChannelTransport;

/// A joined document with its background tasks.
pub struct Connection {
	participant: ParticipantId,
	handle: ClientHandle,
	transport: ChannelTransport,
	cancel: CancellationToken,
	actor: JoinHandle<Result<()>>,
	reader: JoinHandle<()>,
	writer: JoinHandle<()>,
}

/// Connects to a server and joins `document`.
///
/// `text` seeds the document if nobody has it open yet. Once joined, the
/// widget is loaded with the server's text and events are handled by a
/// [`ClientActor`]. Firing `cancel` tears everything down.
///
/// # Errors
///
/// [`ClientError::Codec`] if the connection fails, [`ClientError::Rejected`]
/// if the server refuses the join and [`ClientError::Closed`] if it hangs up
/// before answering.
pub async fn connect<E>(
	addr: impl ToSocketAddrs,
	document: DocumentId,
	name: Option<String>,
	text: &str,
	mut editor: E,
	config: &ClientConfig,
	cancel: CancellationToken,
) -> Result<Connection>
where
	E: EditorAdapter + Send + 'static,
{
	let stream = TcpStream::connect(addr).await.map_err(CodecError::from)?;
	let (read, mut write) = stream.into_split();
	let mut reader = BufReader::new(read);
	let mut buf = String::new();

	write_message(
		&mut write,
		&ClientMessage::Join {
			document: document.clone(),
			name,
			text: text.to_owned(),
		},
	)
	.await?;

	let (participant, revision, text, clients) = loop {
		match read_message::<_, ServerMessage>(&mut reader, &mut buf).await? {
			Some(ServerMessage::Joined {
				document: joined,
				participant,
				revision,
				text,
				clients,
			}) if joined == document => break (participant, revision, text, clients),
			Some(ServerMessage::Error { message, .. }) => return Err(ClientError::Rejected(message)),
			Some(other) => debug!(?other, "client.before_join"),
			None => return Err(ClientError::Closed),
		}
	};
	info!(%document, %participant, %revision, "client.joined");

	editor.set_value(&text);
	let (transport, outbox) = ChannelTransport::channel(document.clone());
	let client = EditorClient::new(revision, clients, editor, transport.clone(), config);
	let (handle, actor) = ClientActor::start(client, cancel.clone());

	let writer = tokio::spawn(async move {
		let mut outbox = outbox;
		while let Some(msg) = outbox.recv().await {
			if let Err(err) = write_message(&mut write, &msg).await {
				warn!(error = %err, "client.write_failed");
				break;
			}
		}
	});
	let reader = tokio::spawn(read_loop(reader, document, handle.clone(), cancel.clone()));

	Ok(Connection {
		participant,
		handle,
		transport,
		cancel,
		actor,
		reader,
		writer,
	})
}

async fn read_loop(
	mut reader: BufReader<OwnedReadHalf>,
	document: DocumentId,
	handle: ClientHandle,
	cancel: CancellationToken,
) {
	let mut buf = String::new();
	loop {
		let msg = tokio::select! {
			_ = cancel.cancelled() => break,
			msg = read_message::<_, ServerMessage>(&mut reader, &mut buf) => msg,
		};
		match msg {
			Ok(Some(msg)) if msg.document().is_none_or(|d| *d == document) => {
				if handle.server(msg).await.is_err() {
					break;
				}
			}
			Ok(Some(msg)) => debug!(?msg, "client.other_document"),
			Ok(None) => {
				info!(%document, "client.server_closed");
				cancel.cancel();
				break;
			}
			Err(err) => {
				warn!(error = %err, "client.read_failed");
				cancel.cancel();
				break;
			}
		}
	}
}

impl Connection {
	/// Identifier the server assigned to us.
	pub fn participant(&self) -> ParticipantId {
		self.participant
	}

	/// Front end for widget events.
	pub fn handle(&self) -> &ClientHandle {
		&self.handle
	}

	/// Changes our display name.
	pub fn set_name(&self, name: impl Into<String>) -> Result<()> {
		self.transport.send(ClientMessage::SetName {
			document: self.transport.document().clone(),
			name: name.into(),
		})
	}

	/// Leaves the document and waits for the background tasks.
	///
	/// Returns the client's fatal error, if it stopped because of one.
	pub async fn close(self) -> Result<()> {
		let Self {
			transport,
			cancel,
			actor,
			reader,
			writer,
			..
		} = self;

		let _ = transport.send(ClientMessage::Leave {
			document: transport.document().clone(),
		});
		cancel.cancel();
		drop(transport);

		let result = actor.await.map_err(|_| ClientError::Closed)?;
		// The writer drains queued messages once the last sender is gone.
		let _ = writer.await;
		let _ = reader.await;
		result
	}
}
