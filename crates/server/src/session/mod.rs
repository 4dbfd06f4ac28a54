//! One shared document and the participants editing it.
//!
//! The session imposes a single order on operations: every accepted
//! operation is transformed past everything accepted since the revision its
//! author last saw, applied, and appended to the history. The author gets an
//! ack, everyone else the transformed operation.
//!
//! Methods return [`Delivery`] lists rather than sending anything, so the
//! session stays synchronous and the caller decides how messages travel.

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;

use tandem_primitives::{Operation, Selection};
use tandem_proto::{DocumentId, ParticipantId, ParticipantInfo, Revision, ServerMessage};
use tracing::{debug, trace};

use crate::error::SessionError;

/// A message addressed to one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
	/// Recipient.
	pub to: ParticipantId,
	/// Message to deliver.
	pub msg: ServerMessage,
}

#[derive(Debug, Clone, Default)]
struct Participant {
	name: Option<String>,
	selection: Option<Selection>,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
	author: ParticipantId,
	operation: Operation,
}

/// Authoritative state of one document.
#[derive(Debug, Clone)]
pub struct Session {
	document: DocumentId,
	text: String,
	/// Revision of `history[0]`; older entries have been discarded.
	base: u64,
	history: Vec<HistoryEntry>,
	max_history: Option<usize>,
	participants: BTreeMap<ParticipantId, Participant>,
}

impl Session {
	/// Creates a session holding `text` at revision 0.
	///
	/// With `max_history` set, only that many operations are kept for
	/// transforming late arrivals.
	pub fn new(document: DocumentId, text: impl Into<String>, max_history: Option<usize>) -> Self {
		Self {
			document,
			text: text.into(),
			base: 0,
			history: Vec::new(),
			max_history,
			participants: BTreeMap::new(),
		}
	}

	/// Document identifier.
	pub fn document(&self) -> &DocumentId {
		&self.document
	}

	/// Current content.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Number of operations accepted so far.
	pub fn revision(&self) -> Revision {
		Revision(self.base + self.history.len() as u64)
	}

	/// Returns true if `participant` has joined.
	pub fn contains(&self, participant: ParticipantId) -> bool {
		self.participants.contains_key(&participant)
	}

	/// Returns true once everybody has left.
	pub fn is_empty(&self) -> bool {
		self.participants.is_empty()
	}

	/// Participants ordered by id.
	pub fn participants(&self) -> Vec<ParticipantInfo> {
		self.participants
			.iter()
			.map(|(id, p)| ParticipantInfo {
				id: *id,
				name: p.name.clone(),
				selection: p.selection.clone(),
			})
			.collect()
	}

	/// Adds a participant.
	///
	/// The joiner receives a snapshot of the document and of everyone else;
	/// everyone else learns about the joiner.
	pub fn join(&mut self, participant: ParticipantId, name: Option<String>) -> Result<Vec<Delivery>, SessionError> {
		if let Some(name) = &name {
			self.check_name(participant, name)?;
		}

		let clients = self.participants().into_iter().filter(|p| p.id != participant).collect();
		let mut out = vec![Delivery {
			to: participant,
			msg: ServerMessage::Joined {
				document: self.document.clone(),
				participant,
				revision: self.revision(),
				text: self.text.clone(),
				clients,
			},
		}];
		out.extend(self.others(
			participant,
			ServerMessage::ClientJoined {
				document: self.document.clone(),
				participant,
				name: name.clone(),
			},
		));

		self.participants.insert(participant, Participant { name, selection: None });
		debug!(document = %self.document, %participant, participants = self.participants.len(), "session.join");
		Ok(out)
	}

	/// Accepts an operation `participant` made against `revision`.
	///
	/// An operation the participant already had accepted since `revision` is
	/// a resend after a reconnect: it is acknowledged again but not applied.
	///
	/// # Errors
	///
	/// [`SessionError::InvalidRevision`] if `revision` is in the future or
	/// has been discarded, [`SessionError::Operation`] if the operation does
	/// not fit. The session is unchanged on error.
	pub fn receive_operation(
		&mut self,
		participant: ParticipantId,
		revision: Revision,
		operation: Operation,
		selection: Option<Selection>,
	) -> Result<Vec<Delivery>, SessionError> {
		if !self.contains(participant) {
			return Err(SessionError::UnknownParticipant(participant));
		}
		let since = self.history_since(revision)?;
		let ack = Delivery {
			to: participant,
			msg: ServerMessage::Ack {
				document: self.document.clone(),
			},
		};

		if since.iter().any(|entry| entry.author == participant) {
			debug!(document = %self.document, %participant, %revision, "session.duplicate_operation");
			return Ok(vec![ack]);
		}

		let mut operation = operation;
		for entry in since {
			operation = Operation::transform(&operation, &entry.operation)?.0;
		}
		self.text = operation.apply(&self.text)?;

		self.history.push(HistoryEntry {
			author: participant,
			operation: operation.clone(),
		});
		self.trim_history();
		if let Some(p) = self.participants.get_mut(&participant) {
			p.selection = selection.clone();
		}
		trace!(document = %self.document, %participant, revision = %self.revision(), %operation, "session.operation");

		let mut out = vec![ack];
		out.extend(self.others(
			participant,
			ServerMessage::Operation {
				document: self.document.clone(),
				participant,
				operation,
				selection,
			},
		));
		Ok(out)
	}

	/// Stores and forwards a participant's selection.
	pub fn update_selection(
		&mut self,
		participant: ParticipantId,
		selection: Option<Selection>,
	) -> Result<Vec<Delivery>, SessionError> {
		let p = self
			.participants
			.get_mut(&participant)
			.ok_or(SessionError::UnknownParticipant(participant))?;
		p.selection = selection.clone();

		Ok(self.others(
			participant,
			ServerMessage::Selection {
				document: self.document.clone(),
				participant,
				selection,
			},
		))
	}

	/// Renames a participant and tells everyone else.
	pub fn set_name(&mut self, participant: ParticipantId, name: String) -> Result<Vec<Delivery>, SessionError> {
		if !self.contains(participant) {
			return Err(SessionError::UnknownParticipant(participant));
		}
		self.check_name(participant, &name)?;
		if let Some(p) = self.participants.get_mut(&participant) {
			p.name = Some(name.clone());
		}

		Ok(self.others(
			participant,
			ServerMessage::SetName {
				document: self.document.clone(),
				participant,
				name,
			},
		))
	}

	/// Removes a participant and tells everyone else.
	///
	/// Leaving twice is harmless.
	pub fn leave(&mut self, participant: ParticipantId) -> Vec<Delivery> {
		if self.participants.remove(&participant).is_none() {
			return Vec::new();
		}
		debug!(document = %self.document, %participant, participants = self.participants.len(), "session.leave");
		self.others(
			participant,
			ServerMessage::ClientLeft {
				document: self.document.clone(),
				participant,
			},
		)
	}

	fn check_name(&self, participant: ParticipantId, name: &str) -> Result<(), SessionError> {
		let taken = self
			.participants
			.iter()
			.any(|(id, p)| *id != participant && p.name.as_deref() == Some(name));
		if taken {
			return Err(SessionError::NameTaken(name.to_owned()));
		}
		Ok(())
	}

	fn history_since(&self, revision: Revision) -> Result<&[HistoryEntry], SessionError> {
		let latest = self.revision();
		if revision > latest || revision.0 < self.base {
			return Err(SessionError::InvalidRevision {
				revision,
				oldest: Revision(self.base),
				latest,
			});
		}
		Ok(&self.history[(revision.0 - self.base) as usize..])
	}

	fn trim_history(&mut self) {
		let Some(max) = self.max_history else {
			return;
		};
		if self.history.len() > max {
			let excess = self.history.len() - max;
			self.history.drain(..excess);
			self.base += excess as u64;
		}
	}

	fn others(&self, except: ParticipantId, msg: ServerMessage) -> Vec<Delivery> {
		self.participants
			.keys()
			.filter(|id| **id != except)
			.map(|id| Delivery { to: *id, msg: msg.clone() })
			.collect()
	}
}
