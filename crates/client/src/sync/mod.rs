//! Client half of the synchronization protocol.
//!
//! At most one local operation is in flight at a time. Edits made while it
//! awaits acknowledgement are composed into a single buffered operation that
//! is sent once the server confirms the outstanding one. Remote operations are
//! transformed past whatever is pending locally before they are applied.
//!
//! ```text
//!                 local edit                     local edit
//! Synchronized ──────────────► AwaitingConfirm ──────────────► AwaitingWithBuffer
//!       ▲          (send)           │    ▲                          │   (compose)
//!       └───────────────────────────┘    └──────────────────────────┘
//!                   ack                        ack (send buffer)
//! ```

#[cfg(test)]
mod tests;

use tandem_primitives::{Operation, OperationError, Selection};
use tandem_proto::Revision;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};

/// Pending local state relative to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SyncState {
	/// Every local edit has been acknowledged.
	#[default]
	Synchronized,
	/// One operation has been sent and awaits acknowledgement.
	AwaitingConfirm {
		/// The unacknowledged operation.
		outstanding: Operation,
	},
	/// One operation is in flight and later edits are held back.
	AwaitingWithBuffer {
		/// The unacknowledged operation.
		outstanding: Operation,
		/// Local edits made since `outstanding` was sent, composed.
		buffer: Operation,
	},
}

impl SyncState {
	/// Short name for logs.
	pub fn name(&self) -> &'static str {
		match self {
			SyncState::Synchronized => "synchronized",
			SyncState::AwaitingConfirm { .. } => "awaiting_confirm",
			SyncState::AwaitingWithBuffer { .. } => "awaiting_with_buffer",
		}
	}
}

/// An operation the caller must transmit, tagged with the revision it is based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
	/// Server revision the operation applies to.
	pub revision: Revision,
	/// The operation to send.
	pub operation: Operation,
}

/// Protocol state machine for one participant in one document.
///
/// Transitions return what the caller has to do (send an operation, apply one
/// to the document) instead of performing I/O, so the machine itself stays
/// synchronous.
#[derive(Debug, Clone, Default)]
pub struct SyncClient {
	revision: Revision,
	state: SyncState,
}

impl SyncClient {
	/// Starts synchronized at `revision`.
	pub fn new(revision: Revision) -> Self {
		Self {
			revision,
			state: SyncState::Synchronized,
		}
	}

	/// Number of server operations this client has seen.
	pub fn revision(&self) -> Revision {
		self.revision
	}

	/// Current protocol state.
	pub fn state(&self) -> &SyncState {
		&self.state
	}

	/// Returns true while later edits are being held back.
	pub fn is_buffering(&self) -> bool {
		matches!(self.state, SyncState::AwaitingWithBuffer { .. })
	}

	/// Records a local edit.
	///
	/// Returns the operation to send when the client was synchronized;
	/// otherwise the edit is held until the outstanding one is acknowledged.
	///
	/// # Errors
	///
	/// [`ClientError::Operation`] if the edit does not follow the pending
	/// local edits; the state is left untouched.
	pub fn apply_client(&mut self, op: Operation) -> Result<Option<Outgoing>> {
		let (next, send) = match &self.state {
			SyncState::Synchronized => {
				let send = Outgoing {
					revision: self.revision,
					operation: op.clone(),
				};
				(SyncState::AwaitingConfirm { outstanding: op }, Some(send))
			}
			SyncState::AwaitingConfirm { outstanding } => {
				if op.base_len() != outstanding.target_len() {
					return Err(OperationError::IncompatibleLengths {
						target: outstanding.target_len(),
						base: op.base_len(),
					}
					.into());
				}
				(
					SyncState::AwaitingWithBuffer {
						outstanding: outstanding.clone(),
						buffer: op,
					},
					None,
				)
			}
			SyncState::AwaitingWithBuffer { outstanding, buffer } => (
				SyncState::AwaitingWithBuffer {
					outstanding: outstanding.clone(),
					buffer: buffer.compose(&op)?,
				},
				None,
			),
		};

		trace!(from = self.state.name(), to = next.name(), revision = %self.revision, "sync.local_edit");
		self.state = next;
		Ok(send)
	}

	/// Integrates an operation the server accepted from someone else.
	///
	/// Returns the operation to apply to the local document: the remote
	/// operation transformed past the outstanding operation and the buffer.
	///
	/// # Errors
	///
	/// [`ClientError::Operation`] if the remote operation does not fit the
	/// pending local state; the state and revision are left untouched.
	pub fn apply_server(&mut self, op: Operation) -> Result<Operation> {
		let (next, apply) = match &self.state {
			SyncState::Synchronized => (SyncState::Synchronized, op),
			SyncState::AwaitingConfirm { outstanding } => {
				let (outstanding, apply) = Operation::transform(outstanding, &op)?;
				(SyncState::AwaitingConfirm { outstanding }, apply)
			}
			SyncState::AwaitingWithBuffer { outstanding, buffer } => {
				let (outstanding, remote) = Operation::transform(outstanding, &op)?;
				let (buffer, apply) = Operation::transform(buffer, &remote)?;
				(SyncState::AwaitingWithBuffer { outstanding, buffer }, apply)
			}
		};

		self.revision = self.revision.next();
		trace!(state = next.name(), revision = %self.revision, "sync.remote_op");
		self.state = next;
		Ok(apply)
	}

	/// Handles the server's acknowledgement of the outstanding operation.
	///
	/// Returns the buffer when it is now due to be sent.
	///
	/// # Errors
	///
	/// [`ClientError::UnexpectedAck`] when nothing is outstanding. The
	/// revision does not advance.
	pub fn server_ack(&mut self) -> Result<Option<Outgoing>> {
		let state = std::mem::take(&mut self.state);
		let (next, send) = match state {
			SyncState::Synchronized => {
				warn!(revision = %self.revision, "sync.unexpected_ack");
				return Err(ClientError::UnexpectedAck);
			}
			SyncState::AwaitingConfirm { .. } => (SyncState::Synchronized, None),
			SyncState::AwaitingWithBuffer { buffer, .. } => (
				SyncState::AwaitingConfirm {
					outstanding: buffer.clone(),
				},
				Some(buffer),
			),
		};

		self.revision = self.revision.next();
		debug!(to = next.name(), revision = %self.revision, "sync.ack");
		self.state = next;
		Ok(send.map(|operation| Outgoing {
			revision: self.revision,
			operation,
		}))
	}

	/// Returns the outstanding operation to resend after the connection was
	/// re-established. The buffer is not sent; it follows the next ack.
	pub fn server_reconnect(&self) -> Option<Outgoing> {
		match &self.state {
			SyncState::Synchronized => None,
			SyncState::AwaitingConfirm { outstanding } | SyncState::AwaitingWithBuffer { outstanding, .. } => {
				debug!(revision = %self.revision, "sync.resend");
				Some(Outgoing {
					revision: self.revision,
					operation: outstanding.clone(),
				})
			}
		}
	}

	/// Moves a selection received from the server into local coordinates by
	/// passing it through the pending local operations.
	pub fn transform_selection(&self, selection: &Selection) -> Selection {
		match &self.state {
			SyncState::Synchronized => selection.clone(),
			SyncState::AwaitingConfirm { outstanding } => selection.transform(outstanding),
			SyncState::AwaitingWithBuffer { outstanding, buffer } => {
				selection.transform(outstanding).transform(buffer)
			}
		}
	}
}
