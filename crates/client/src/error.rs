//! Error types for the collaborative editing client.

use std::path::PathBuf;

use tandem_editor_core::UndoError;
use tandem_primitives::OperationError;
use tandem_proto::CodecError;
use thiserror::Error;

/// Errors raised while driving a collaborative editing session.
#[derive(Debug, Error)]
pub enum ClientError {
	/// The server acknowledged an operation while none was outstanding.
	///
	/// Client and server disagree about the session's history; the session
	/// cannot continue.
	#[error("server acknowledged an operation that was never sent")]
	UnexpectedAck,

	/// An operation did not fit the document or the pending local state.
	#[error(transparent)]
	Operation(#[from] OperationError),

	/// The undo history could not be updated.
	#[error(transparent)]
	Undo(#[from] UndoError),

	/// Reading or writing a protocol message failed.
	#[error(transparent)]
	Codec(#[from] CodecError),

	/// The server refused to let us join.
	#[error("join rejected: {0}")]
	Rejected(String),

	/// The connection or the client task has shut down.
	#[error("client session closed")]
	Closed,
}

impl ClientError {
	/// Returns true if the session cannot continue after this error.
	pub fn is_fatal(&self) -> bool {
		matches!(self, ClientError::UnexpectedAck | ClientError::Closed | ClientError::Codec(_))
	}
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when loading client configuration.
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
