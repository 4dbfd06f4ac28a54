//! Identifiers and messages of the collaboration protocol.

use std::fmt;

use serde::{Deserialize, Serialize};
use tandem_primitives::{Operation, Selection};

/// Identifier the server assigns to each connected participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Opaque identifier of a shared document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

impl DocumentId {
	/// Returns the identifier as a string slice.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for DocumentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for DocumentId {
	fn from(id: &str) -> Self {
		Self(id.to_owned())
	}
}

impl From<String> for DocumentId {
	fn from(id: String) -> Self {
		Self(id)
	}
}

/// Number of operations the server has accepted for a document.
///
/// A client tags every operation with the revision it was based on; the
/// server transforms it past everything accepted since.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Revision(pub u64);

impl Revision {
	/// Returns the revision after one more accepted operation.
	#[must_use]
	pub fn next(self) -> Self {
		Self(self.0 + 1)
	}
}

impl fmt::Display for Revision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// A participant as listed in a [`ServerMessage::Joined`] snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
	/// Server-assigned identifier.
	pub id: ParticipantId,
	/// Display name, once the participant has chosen one.
	pub name: Option<String>,
	/// Last selection the participant published.
	pub selection: Option<Selection>,
}

/// Messages sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
	/// Join a document, creating it with `text` if nobody has it open.
	Join {
		/// Document to join.
		document: DocumentId,
		/// Display name.
		name: Option<String>,
		/// Initial content used only when the document does not exist yet.
		text: String,
	},
	/// A local edit based on `revision`.
	Operation {
		/// Document the edit applies to.
		document: DocumentId,
		/// Revision the edit was made against.
		revision: Revision,
		/// The edit.
		operation: Operation,
		/// Author's selection after the edit.
		selection: Option<Selection>,
	},
	/// The author's selection moved, or was cleared with `None`.
	Selection {
		/// Document the selection refers to.
		document: DocumentId,
		/// New selection.
		selection: Option<Selection>,
	},
	/// Change the display name.
	SetName {
		/// Document whose roster shows the name.
		document: DocumentId,
		/// New name.
		name: String,
	},
	/// Stop participating in a document.
	Leave {
		/// Document to leave.
		document: DocumentId,
	},
}

impl ClientMessage {
	/// Returns the document this message refers to.
	pub fn document(&self) -> &DocumentId {
		match self {
			ClientMessage::Join { document, .. }
			| ClientMessage::Operation { document, .. }
			| ClientMessage::Selection { document, .. }
			| ClientMessage::SetName { document, .. }
			| ClientMessage::Leave { document } => document,
		}
	}
}

/// Messages sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
	/// Snapshot answering a join.
	Joined {
		/// Joined document.
		document: DocumentId,
		/// Identifier assigned to the joining participant.
		participant: ParticipantId,
		/// Revision of `text`.
		revision: Revision,
		/// Current document content.
		text: String,
		/// Everyone else in the document.
		clients: Vec<ParticipantInfo>,
	},
	/// Another participant's accepted edit, already transformed to the
	/// server's latest revision.
	Operation {
		/// Document the edit applies to.
		document: DocumentId,
		/// Author of the edit.
		participant: ParticipantId,
		/// The edit.
		operation: Operation,
		/// Author's selection after the edit.
		selection: Option<Selection>,
	},
	/// Another participant's selection moved or was cleared.
	Selection {
		/// Document the selection refers to.
		document: DocumentId,
		/// Owner of the selection.
		participant: ParticipantId,
		/// New selection.
		selection: Option<Selection>,
	},
	/// The receiver's outstanding operation was accepted.
	Ack {
		/// Document the accepted operation belongs to.
		document: DocumentId,
	},
	/// A participant joined.
	ClientJoined {
		/// Joined document.
		document: DocumentId,
		/// New participant.
		participant: ParticipantId,
		/// Display name, if given on join.
		name: Option<String>,
	},
	/// A participant changed its display name.
	SetName {
		/// Document whose roster changed.
		document: DocumentId,
		/// Renamed participant.
		participant: ParticipantId,
		/// New name.
		name: String,
	},
	/// A participant left.
	ClientLeft {
		/// Document that was left.
		document: DocumentId,
		/// Departed participant.
		participant: ParticipantId,
	},
	/// A request was rejected.
	Error {
		/// Document the rejected request referred to, if any.
		document: Option<DocumentId>,
		/// Human-readable reason.
		message: String,
	},
}

impl ServerMessage {
	/// Returns the document this message refers to.
	pub fn document(&self) -> Option<&DocumentId> {
		match self {
			ServerMessage::Joined { document, .. }
			| ServerMessage::Operation { document, .. }
			| ServerMessage::Selection { document, .. }
			| ServerMessage::Ack { document }
			| ServerMessage::ClientJoined { document, .. }
			| ServerMessage::SetName { document, .. }
			| ServerMessage::ClientLeft { document, .. } => Some(document),
			ServerMessage::Error { document, .. } => document.as_ref(),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use serde_json::json;
	use tandem_primitives::Range;

	use super::*;

	#[test]
	fn operation_message_wire_shape() {
		let msg = ClientMessage::Operation {
			document: "notes".into(),
			revision: Revision(4),
			operation: Operation::builder().retain(2).insert("hi").delete(1).build(),
			selection: Some(Selection::cursor(4)),
		};

		let value = serde_json::to_value(&msg).unwrap();
		assert_eq!(
			value,
			json!({
				"type": "operation",
				"document": "notes",
				"revision": 4,
				"operation": [2, "hi", -1],
				"selection": { "ranges": [{ "anchor": 4, "head": 4 }] }
			})
		);
		assert_eq!(serde_json::from_value::<ClientMessage>(value).unwrap(), msg);
	}

	#[test]
	fn joined_snapshot_roundtrip() {
		let msg = ServerMessage::Joined {
			document: "doc".into(),
			participant: ParticipantId(7),
			revision: Revision(12),
			text: "héllo".into(),
			clients: vec![ParticipantInfo {
				id: ParticipantId(3),
				name: Some("ada".into()),
				selection: Some(Selection::new([Range::new(0, 2)])),
			}],
		};

		let line = serde_json::to_string(&msg).unwrap();
		assert_eq!(serde_json::from_str::<ServerMessage>(&line).unwrap(), msg);
	}

	#[test]
	fn cleared_selection_is_null() {
		let msg = ClientMessage::Selection {
			document: "doc".into(),
			selection: None,
		};
		assert_eq!(
			serde_json::to_value(&msg).unwrap(),
			json!({ "type": "selection", "document": "doc", "selection": null })
		);
	}

	#[test]
	fn invalid_operation_is_rejected() {
		let value = json!({
			"type": "operation",
			"document": "doc",
			"revision": 0,
			"operation": [0],
			"selection": null
		});
		assert!(serde_json::from_value::<ClientMessage>(value).is_err());
	}

	#[test]
	fn document_accessor() {
		let ack = ServerMessage::Ack { document: "a".into() };
		assert_eq!(ack.document(), Some(&DocumentId::from("a")));

		let err = ServerMessage::Error {
			document: None,
			message: "bad".into(),
		};
		assert_eq!(err.document(), None);
	}
}
