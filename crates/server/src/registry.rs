//! Every open document, keyed by id.

use rustc_hash::FxHashMap;
use tandem_proto::{ClientMessage, DocumentId, ParticipantId};
use tracing::info;

use crate::error::ServerError;
use crate::session::{Delivery, Session};

/// Sessions of all open documents.
///
/// A session is created by the first join that names its document and is
/// dropped when its last participant leaves.
#[derive(Debug, Default)]
pub struct SessionRegistry {
	sessions: FxHashMap<DocumentId, Session>,
	next_participant: u64,
	max_history: Option<usize>,
}

impl SessionRegistry {
	/// Creates an empty registry whose sessions keep at most `max_history`
	/// operations each.
	pub fn new(max_history: Option<usize>) -> Self {
		Self {
			sessions: FxHashMap::default(),
			next_participant: 0,
			max_history,
		}
	}

	/// Hands out a fresh participant id.
	pub fn allocate_participant(&mut self) -> ParticipantId {
		self.next_participant += 1;
		ParticipantId(self.next_participant)
	}

	/// Returns the session for `document`.
	pub fn session(&self, document: &DocumentId) -> Option<&Session> {
		self.sessions.get(document)
	}

	/// Number of open documents.
	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	/// Returns true if no document is open.
	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}

	/// Routes a message from `participant` to its document's session.
	///
	/// # Errors
	///
	/// [`ServerError::UnknownSession`] if the document is not open, otherwise
	/// whatever the session rejects.
	pub fn dispatch(&mut self, participant: ParticipantId, msg: ClientMessage) -> Result<Vec<Delivery>, ServerError> {
		match msg {
			ClientMessage::Join { document, name, text } => self.join(participant, document, name, text),
			ClientMessage::Operation {
				document,
				revision,
				operation,
				selection,
			} => Ok(self
				.session_mut(&document)?
				.receive_operation(participant, revision, operation, selection)?),
			ClientMessage::Selection { document, selection } => {
				Ok(self.session_mut(&document)?.update_selection(participant, selection)?)
			}
			ClientMessage::SetName { document, name } => Ok(self.session_mut(&document)?.set_name(participant, name)?),
			ClientMessage::Leave { document } => Ok(self.leave(participant, &document)),
		}
	}

	/// Removes `participant` from every document it joined.
	pub fn disconnect(&mut self, participant: ParticipantId) -> Vec<Delivery> {
		let documents: Vec<_> = self
			.sessions
			.iter()
			.filter(|(_, session)| session.contains(participant))
			.map(|(document, _)| document.clone())
			.collect();

		documents
			.iter()
			.flat_map(|document| self.leave(participant, document))
			.collect()
	}

	fn join(
		&mut self,
		participant: ParticipantId,
		document: DocumentId,
		name: Option<String>,
		text: String,
	) -> Result<Vec<Delivery>, ServerError> {
		let max_history = self.max_history;
		let session = self.sessions.entry(document.clone()).or_insert_with(|| {
			info!(%document, "session.created");
			Session::new(document.clone(), text, max_history)
		});

		Ok(session.join(participant, name)?)
	}

	fn leave(&mut self, participant: ParticipantId, document: &DocumentId) -> Vec<Delivery> {
		let Some(session) = self.sessions.get_mut(document) else {
			return Vec::new();
		};
		let out = session.leave(participant);
		if session.is_empty() {
			self.sessions.remove(document);
			info!(%document, "session.closed");
		}
		out
	}

	fn session_mut(&mut self, document: &DocumentId) -> Result<&mut Session, ServerError> {
		self.sessions
			.get_mut(document)
			.ok_or_else(|| ServerError::UnknownSession(document.clone()))
	}
}
