//! Error types for the collaboration server.

use std::path::PathBuf;

use tandem_primitives::OperationError;
use tandem_proto::{DocumentId, ParticipantId, Revision};
use thiserror::Error;

/// Errors raised by a single document session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
	/// The operation is based on a revision the session cannot transform from.
	#[error("revision {revision} is outside the retained history {oldest}..={latest}")]
	InvalidRevision {
		/// Revision the client claimed.
		revision: Revision,
		/// Oldest revision still in the history.
		oldest: Revision,
		/// Current revision.
		latest: Revision,
	},

	/// The participant has not joined this document.
	#[error("participant {0} has not joined")]
	UnknownParticipant(ParticipantId),

	/// Another participant in the document already uses this name.
	#[error("name {0:?} is already taken")]
	NameTaken(String),

	/// The operation does not fit the document.
	#[error(transparent)]
	Operation(#[from] OperationError),
}

/// Errors raised while routing a message to a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
	/// No session exists for the document.
	#[error("unknown document {0}")]
	UnknownSession(DocumentId),

	/// The session rejected the request.
	#[error(transparent)]
	Session(#[from] SessionError),

	/// The registry actor has shut down.
	#[error("registry closed")]
	Closed,
}

/// Errors that can occur when loading server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an invalid value.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}
