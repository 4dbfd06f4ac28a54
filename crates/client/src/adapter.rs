//! Capabilities the client needs from the text widget and the transport.

use tandem_primitives::{Operation, OperationError, Selection};
use tandem_proto::{ParticipantId, Revision};

use crate::color::ParticipantColor;
use crate::error::Result;

/// The text widget being edited.
///
/// The widget reports local edits to [`EditorClient`](crate::EditorClient)
/// as `(operation, inverse)` pairs; it must not report the operations the
/// client applies through [`apply_operation`](Self::apply_operation).
pub trait EditorAdapter {
	/// Current document content.
	fn value(&self) -> String;

	/// Replaces the whole content, used once when joining an existing document.
	fn set_value(&mut self, text: &str);

	/// Applies a remote (or undo/redo) operation without echoing it back as a
	/// local change. The local selection moves with the text.
	fn apply_operation(&mut self, op: &Operation) -> std::result::Result<(), OperationError>;

	/// Current local selection.
	fn selection(&self) -> Selection;

	/// Moves the local selection.
	fn set_selection(&mut self, selection: &Selection);

	/// Draws another participant's selection, replacing any previous one.
	fn show_remote_selection(&mut self, participant: ParticipantId, selection: &Selection, color: &ParticipantColor);

	/// Removes another participant's selection.
	fn clear_remote_selection(&mut self, participant: ParticipantId);
}

/// Outbound half of the connection to the server.
pub trait ServerAdapter {
	/// Sends a local operation based on `revision`, with the selection after it.
	fn send_operation(&mut self, revision: Revision, operation: &Operation, selection: Option<&Selection>) -> Result<()>;

	/// Publishes the local selection, or clears it with `None`.
	fn send_selection(&mut self, selection: Option<&Selection>) -> Result<()>;
}
