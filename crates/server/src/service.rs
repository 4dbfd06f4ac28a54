//! Actor owning the [`SessionRegistry`].
//!
//! Every connection task talks to the registry through a [`RegistryHandle`];
//! the actor applies commands one at a time and routes the resulting
//! deliveries to the recipients' outboxes, so all sessions see a single
//! order of events without locks.

use rustc_hash::FxHashMap;
use tandem_proto::{ClientMessage, DocumentId, ParticipantId, ParticipantInfo, Revision, ServerMessage};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ServerError;
use crate::registry::SessionRegistry;
use crate::session::Delivery;

/// Outbound queue of one connection.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Commands for the registry actor.
#[derive(Debug)]
pub enum RegistryCmd {
	/// A connection opened.
	Connect {
		/// Where messages for the new participant go.
		outbox: Outbox,
		/// Reply channel for the assigned id.
		reply: oneshot::Sender<ParticipantId>,
	},
	/// A message arrived from a participant.
	Message {
		/// Sender.
		participant: ParticipantId,
		/// The message.
		msg: ClientMessage,
	},
	/// A connection closed.
	Disconnect {
		/// Participant whose connection closed.
		participant: ParticipantId,
	},
	/// Read a document's state.
	Snapshot {
		/// Document to read.
		document: DocumentId,
		/// Reply channel; `None` if the document is not open.
		reply: oneshot::Sender<Option<SessionSnapshot>>,
	},
}

/// Point-in-time view of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
	/// Current content.
	pub text: String,
	/// Number of accepted operations.
	pub revision: Revision,
	/// Participants ordered by id.
	pub participants: Vec<ParticipantInfo>,
}

/// Actor service serializing access to every session.
pub struct RegistryService {
	rx: mpsc::Receiver<RegistryCmd>,
	registry: SessionRegistry,
	outboxes: FxHashMap<ParticipantId, Outbox>,
	shutdown: CancellationToken,
}

impl RegistryService {
	/// Spawns the registry actor.
	///
	/// It runs until `shutdown` fires or every handle is dropped.
	pub fn start(registry: SessionRegistry, capacity: usize, shutdown: CancellationToken) -> RegistryHandle {
		let (tx, rx) = mpsc::channel(capacity);
		let service = Self {
			rx,
			registry,
			outboxes: FxHashMap::default(),
			shutdown,
		};
		tokio::spawn(service.run());
		RegistryHandle { tx }
	}

	async fn run(mut self) {
		loop {
			tokio::select! {
				biased;
				_ = self.shutdown.cancelled() => {
					info!(documents = self.registry.len(), "registry.shutdown");
					break;
				}
				cmd = self.rx.recv() => {
					let Some(cmd) = cmd else {
						break;
					};
					self.handle(cmd);
				}
			}
		}
	}

	fn handle(&mut self, cmd: RegistryCmd) {
		match cmd {
			RegistryCmd::Connect { outbox, reply } => {
				let participant = self.registry.allocate_participant();
				self.outboxes.insert(participant, outbox);
				debug!(%participant, "registry.connect");
				let _ = reply.send(participant);
			}
			RegistryCmd::Message { participant, msg } => {
				let document = msg.document().clone();
				match self.registry.dispatch(participant, msg) {
					Ok(out) => self.deliver(out),
					Err(err) => {
						warn!(%participant, %document, error = %err, "registry.rejected");
						self.send(
							participant,
							ServerMessage::Error {
								document: Some(document),
								message: err.to_string(),
							},
						);
					}
				}
			}
			RegistryCmd::Disconnect { participant } => {
				let out = self.registry.disconnect(participant);
				self.outboxes.remove(&participant);
				debug!(%participant, "registry.disconnect");
				self.deliver(out);
			}
			RegistryCmd::Snapshot { document, reply } => {
				let snapshot = self.registry.session(&document).map(|session| SessionSnapshot {
					text: session.text().to_owned(),
					revision: session.revision(),
					participants: session.participants(),
				});
				let _ = reply.send(snapshot);
			}
		}
	}

	fn deliver(&mut self, out: Vec<Delivery>) {
		for Delivery { to, msg } in out {
			self.send(to, msg);
		}
	}

	fn send(&mut self, to: ParticipantId, msg: ServerMessage) {
		let Some(outbox) = self.outboxes.get(&to) else {
			return;
		};
		if outbox.send(msg).is_err() {
			// The connection task is gone; its disconnect is on the way.
			debug!(participant = %to, "registry.outbox_closed");
			self.outboxes.remove(&to);
		}
	}
}

/// Cloneable front end of the [`RegistryService`].
#[derive(Debug, Clone)]
pub struct RegistryHandle {
	tx: mpsc::Sender<RegistryCmd>,
}

impl RegistryHandle {
	/// Registers a connection and returns the participant id assigned to it.
	pub async fn connect(&self, outbox: Outbox) -> Result<ParticipantId, ServerError> {
		let (reply, rx) = oneshot::channel();
		self.tx
			.send(RegistryCmd::Connect { outbox, reply })
			.await
			.map_err(|_| ServerError::Closed)?;
		rx.await.map_err(|_| ServerError::Closed)
	}

	/// Forwards a message from `participant`.
	pub async fn message(&self, participant: ParticipantId, msg: ClientMessage) -> Result<(), ServerError> {
		self.tx
			.send(RegistryCmd::Message { participant, msg })
			.await
			.map_err(|_| ServerError::Closed)
	}

	/// Reports that `participant`'s connection closed.
	pub async fn disconnect(&self, participant: ParticipantId) -> Result<(), ServerError> {
		self.tx
			.send(RegistryCmd::Disconnect { participant })
			.await
			.map_err(|_| ServerError::Closed)
	}

	/// Reads a document's state.
	pub async fn snapshot(&self, document: DocumentId) -> Result<Option<SessionSnapshot>, ServerError> {
		let (reply, rx) = oneshot::channel();
		self.tx
			.send(RegistryCmd::Snapshot { document, reply })
			.await
			.map_err(|_| ServerError::Closed)?;
		rx.await.map_err(|_| ServerError::Closed)
	}
}
