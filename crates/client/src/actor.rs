//! Task owning an [`EditorClient`].
//!
//! Widget callbacks and the network reader run on different tasks, but the
//! client must see their events one at a time. [`ClientActor`] owns the client
//! and drains a single command queue; [`ClientHandle`] is the cloneable front
//! end everything else talks to.

use tandem_primitives::Operation;
use tandem_proto::{Revision, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::adapter::{EditorAdapter, ServerAdapter};
use crate::editor_client::EditorClient;
use crate::error::{ClientError, Result};
use crate::roster::RemoteParticipant;
use crate::sync::SyncState;

/// Depth of the command queue.
pub const MAILBOX_CAPACITY: usize = 256;

/// Commands for the client actor.
#[derive(Debug)]
pub enum ClientCmd {
	/// The widget reported a local edit.
	Change {
		/// The edit.
		op: Operation,
		/// Its inverse against the text before the edit.
		inverse: Operation,
		/// Reply channel for the outcome.
		reply: oneshot::Sender<Result<()>>,
	},
	/// The widget's selection moved.
	SelectionChanged {
		/// Reply channel for the outcome.
		reply: oneshot::Sender<Result<()>>,
	},
	/// The widget lost focus.
	Blur {
		/// Reply channel for the outcome.
		reply: oneshot::Sender<Result<()>>,
	},
	/// Undo the last local edit.
	Undo {
		/// Reply channel for the outcome.
		reply: oneshot::Sender<Result<()>>,
	},
	/// Redo the last undone edit.
	Redo {
		/// Reply channel for the outcome.
		reply: oneshot::Sender<Result<()>>,
	},
	/// A message from the server.
	Server(ServerMessage),
	/// The connection was re-established.
	Reconnect,
	/// Read the client's current state.
	Snapshot {
		/// Reply channel for the snapshot.
		reply: oneshot::Sender<ClientSnapshot>,
	},
}

/// Point-in-time view of a running client.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
	/// Server revision the client has caught up with.
	pub revision: Revision,
	/// Widget content.
	pub text: String,
	/// Pending local state.
	pub state: SyncState,
	/// Remote participants ordered by id.
	pub participants: Vec<RemoteParticipant>,
}

/// Actor serializing every event of one [`EditorClient`].
pub struct ClientActor<E, S> {
	rx: mpsc::Receiver<ClientCmd>,
	client: EditorClient<E, S>,
	cancel: CancellationToken,
}

impl<E, S> ClientActor<E, S>
where
	E: EditorAdapter + Send + 'static,
	S: ServerAdapter + Send + 'static,
{
	/// Spawns the actor.
	///
	/// The task ends when every handle is dropped, when `cancel` fires, or
	/// after a fatal error, which it returns.
	pub fn start(client: EditorClient<E, S>, cancel: CancellationToken) -> (ClientHandle, JoinHandle<Result<()>>) {
		let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
		let actor = Self { rx, client, cancel };
		(ClientHandle { tx }, tokio::spawn(actor.run()))
	}

	async fn run(mut self) -> Result<()> {
		loop {
			tokio::select! {
				_ = self.cancel.cancelled() => {
					debug!("client.cancelled");
					return Ok(());
				}
				cmd = self.rx.recv() => {
					let Some(cmd) = cmd else {
						debug!("client.handles_dropped");
						return Ok(());
					};
					if let Err(err) = self.dispatch(cmd) {
						if err.is_fatal() {
							error!(error = %err, "client.fatal");
							return Err(err);
						}
						warn!(error = %err, "client.event_failed");
					}
				}
			}
		}
	}

	/// Handles one command. Local events report their outcome to the caller;
	/// only fatal ones also stop the actor.
	fn dispatch(&mut self, cmd: ClientCmd) -> Result<()> {
		let client = &mut self.client;
		match cmd {
			ClientCmd::Change { op, inverse, reply } => respond(reply, client.on_change(op, inverse)),
			ClientCmd::SelectionChanged { reply } => respond(reply, client.on_selection_change()),
			ClientCmd::Blur { reply } => respond(reply, client.on_blur()),
			ClientCmd::Undo { reply } => respond(reply, client.undo()),
			ClientCmd::Redo { reply } => respond(reply, client.redo()),
			ClientCmd::Server(msg) => client.handle(msg),
			ClientCmd::Reconnect => client.server_reconnect(),
			ClientCmd::Snapshot { reply } => {
				let _ = reply.send(snapshot(client));
				Ok(())
			}
		}
	}
}

fn respond(reply: oneshot::Sender<Result<()>>, result: Result<()>) -> Result<()> {
	let fatal = matches!(&result, Err(err) if err.is_fatal());
	let _ = reply.send(result);
	if fatal { Err(ClientError::Closed) } else { Ok(()) }
}

fn snapshot<E: EditorAdapter, S: ServerAdapter>(client: &EditorClient<E, S>) -> ClientSnapshot {
	let mut participants: Vec<_> = client.roster().iter().cloned().collect();
	participants.sort_by_key(|p| p.id);
	ClientSnapshot {
		revision: client.revision(),
		text: client.editor().value(),
		state: client.state().clone(),
		participants,
	}
}

/// Cloneable front end of a [`ClientActor`].
#[derive(Debug, Clone)]
pub struct ClientHandle {
	tx: mpsc::Sender<ClientCmd>,
}

impl ClientHandle {
	/// Reports a local edit.
	pub async fn change(&self, op: Operation, inverse: Operation) -> Result<()> {
		self.request(|reply| ClientCmd::Change { op, inverse, reply }).await?
	}

	/// Reports that the widget's selection moved.
	pub async fn selection_changed(&self) -> Result<()> {
		self.request(|reply| ClientCmd::SelectionChanged { reply }).await?
	}

	/// Reports that the widget lost focus.
	pub async fn blur(&self) -> Result<()> {
		self.request(|reply| ClientCmd::Blur { reply }).await?
	}

	/// Undoes the last local edit.
	pub async fn undo(&self) -> Result<()> {
		self.request(|reply| ClientCmd::Undo { reply }).await?
	}

	/// Redoes the last undone edit.
	pub async fn redo(&self) -> Result<()> {
		self.request(|reply| ClientCmd::Redo { reply }).await?
	}

	/// Delivers a server message.
	pub async fn server(&self, msg: ServerMessage) -> Result<()> {
		self.tx.send(ClientCmd::Server(msg)).await.map_err(|_| ClientError::Closed)
	}

	/// Reports that the connection was re-established.
	pub async fn reconnect(&self) -> Result<()> {
		self.tx.send(ClientCmd::Reconnect).await.map_err(|_| ClientError::Closed)
	}

	/// Reads the client's current state.
	///
	/// The snapshot reflects every event queued before the call.
	pub async fn snapshot(&self) -> Result<ClientSnapshot> {
		self.request(|reply| ClientCmd::Snapshot { reply }).await
	}

	async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> ClientCmd) -> Result<T> {
		let (reply, rx) = oneshot::channel();
		self.tx.send(make(reply)).await.map_err(|_| ClientError::Closed)?;
		rx.await.map_err(|_| ClientError::Closed)
	}
}
