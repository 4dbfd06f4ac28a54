//! Ties the text widget, the undo history and the sync state machine together.
//!
//! [`EditorClient`] receives every event of one participant in one document
//! (local edits, selection moves, undo/redo requests and server messages) and
//! translates each into calls on the widget, the [`UndoManager`] and the
//! [`ServerAdapter`]. Events must be delivered one at a time; the actor in
//! [`crate::actor`] does that for asynchronous callers.


use tandem_editor_core::{UndoError, UndoManager};
use tandem_primitives::{Operation, OperationError, Selection, SelectionPair, WrappedOperation};
use tandem_proto::{ParticipantId, ParticipantInfo, Revision, ServerMessage};
use tracing::{debug, trace, warn};

use crate::adapter::{EditorAdapter, ServerAdapter};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::roster::Roster;
use crate::sync::{Outgoing, SyncClient, SyncState};

/// Collaborative editing session for one participant in one document.
pub struct EditorClient<E, S> {
	core: ClientCore<E, S>,
	undo: UndoManager,
}

/// Everything except the undo history, so undo/redo can borrow both halves.
struct ClientCore<E, S> {
	sync: SyncClient,
	/// Last known local selection; `None` while the widget is unfocused.
	selection: Option<Selection>,
	roster: Roster,
	editor: E,
	server: S,
}

impl<E: EditorAdapter, S: ServerAdapter> EditorClient<E, S> {
	/// Starts a session at `revision` from a join snapshot.
	///
	/// `editor` must already hold the document text of that revision.
	/// Selections in `clients` are drawn right away.
	pub fn new(
		revision: Revision,
		clients: impl IntoIterator<Item = ParticipantInfo>,
		editor: E,
		server: S,
		config: &ClientConfig,
	) -> Self {
		let mut core = ClientCore {
			sync: SyncClient::new(revision),
			selection: Some(editor.selection()),
			roster: Roster::new(config.color.clone()),
			editor,
			server,
		};
		for info in clients {
			let id = info.id;
			core.roster.insert(info);
			core.redraw(id);
		}
		debug!(%revision, participants = core.roster.len(), "client.start");

		Self {
			core,
			undo: UndoManager::new(config.max_undo_items),
		}
	}

	/// Server revision the client has caught up with.
	pub fn revision(&self) -> Revision {
		self.core.sync.revision()
	}

	/// Pending local state.
	pub fn state(&self) -> &SyncState {
		self.core.sync.state()
	}

	/// Other participants in the document.
	pub fn roster(&self) -> &Roster {
		&self.core.roster
	}

	/// The widget.
	pub fn editor(&self) -> &E {
		&self.core.editor
	}

	/// The transport.
	pub fn server(&self) -> &S {
		&self.core.server
	}

	/// Local undo history.
	pub fn undo_manager(&self) -> &UndoManager {
		&self.undo
	}

	/// Last local selection reported by the widget.
	pub fn selection(&self) -> Option<&Selection> {
		self.core.selection.as_ref()
	}

	/// Handles a local edit reported by the widget as `op` with its `inverse`.
	///
	/// The inverse is recorded for undo, merged into the previous entry when
	/// both edits are simple and adjacent, and `op` is sent or buffered.
	///
	/// # Errors
	///
	/// [`ClientError::Operation`] if `op` and `inverse` disagree with each
	/// other, with the widget's text or with the pending local edits. Nothing
	/// is recorded, sent or redrawn in that case.
	pub fn on_change(&mut self, op: Operation, inverse: Operation) -> Result<()> {
		let len = self.core.editor.value().chars().count();
		check_change(&op, &inverse, len)?;

		let after = self.core.editor.selection();
		let before = self
			.core
			.selection
			.clone()
			.unwrap_or_else(|| after.transform(&inverse));

		let mut sync = self.core.sync.clone();
		let send = sync.apply_client(op.clone())?;

		let compose = self
			.undo
			.last_undo()
			.is_some_and(|top| inverse.should_be_composed_with_inverted(&top.operation));
		self.undo
			.add(WrappedOperation::new(inverse, SelectionPair::new(after.clone(), before)), compose)?;

		self.core.sync = sync;
		self.core.selection = Some(after);
		self.core.local_edit(&op, send)
	}

	/// Handles the widget's selection moving.
	///
	/// Nothing is sent if the selection did not change.
	pub fn on_selection_change(&mut self) -> Result<()> {
		let selection = self.core.editor.selection();
		if self.core.selection.as_ref() == Some(&selection) {
			return Ok(());
		}
		self.core.selection = Some(selection.clone());
		self.core.send_selection(Some(&selection))
	}

	/// Handles the widget losing focus: the local selection is withdrawn.
	pub fn on_blur(&mut self) -> Result<()> {
		self.core.selection = None;
		self.core.send_selection(None)
	}

	/// Reverts the most recent local edit still in the history.
	///
	/// Does nothing when there is nothing to undo.
	pub fn undo(&mut self) -> Result<()> {
		let Self { core, undo } = self;
		ignore_empty(undo.perform_undo(|undo, entry| core.apply_unredo(undo, entry)))
	}

	/// Reapplies the most recently undone edit.
	///
	/// Does nothing when there is nothing to redo.
	pub fn redo(&mut self) -> Result<()> {
		let Self { core, undo } = self;
		ignore_empty(undo.perform_redo(|undo, entry| core.apply_unredo(undo, entry)))
	}

	/// Integrates an operation the server accepted from another participant.
	///
	/// Fails closed: if the operation does not fit, neither the widget nor the
	/// protocol state change.
	pub fn apply_server(&mut self, op: Operation) -> Result<()> {
		let core = &mut self.core;
		let mut sync = core.sync.clone();
		let apply = sync.apply_server(op)?;
		core.editor.apply_operation(&apply)?;
		core.sync = sync;

		if core.selection.is_some() {
			core.selection = Some(core.editor.selection());
		}
		core.roster.transform_selections(&apply);
		core.redraw_all();
		self.undo.transform(&apply)?;
		Ok(())
	}

	/// Handles the server's acknowledgement, sending the buffer if one is held.
	pub fn server_ack(&mut self) -> Result<()> {
		let send = self.core.sync.server_ack()?;
		self.core.send(send)
	}

	/// Resends the outstanding operation after the connection came back.
	pub fn server_reconnect(&mut self) -> Result<()> {
		let send = self.core.sync.server_reconnect();
		self.core.send(send)
	}

	/// Shows another participant's selection, or clears it with `None`.
	///
	/// `selection` refers to the server's latest revision and is moved past
	/// the local edits the server has not seen yet.
	pub fn on_remote_selection(&mut self, participant: ParticipantId, selection: Option<Selection>) {
		let core = &mut self.core;
		let selection = selection.map(|selection| core.sync.transform_selection(&selection));
		core.roster.get_or_insert(participant).selection = selection;
		core.redraw(participant);
	}

	/// Adds a participant that joined after us.
	pub fn on_client_joined(&mut self, participant: ParticipantId, name: Option<String>) {
		debug!(%participant, ?name, "client.participant_joined");
		self.core.roster.insert(ParticipantInfo {
			id: participant,
			name,
			selection: None,
		});
	}

	/// Renames a participant, repainting its selection in the new colour.
	pub fn on_set_name(&mut self, participant: ParticipantId, name: String) {
		if self.core.roster.set_name(participant, name) {
			self.core.redraw(participant);
		}
	}

	/// Forgets a participant and removes its selection.
	pub fn on_client_left(&mut self, participant: ParticipantId) {
		if self.core.roster.remove(participant).is_some() {
			debug!(%participant, "client.participant_left");
			self.core.editor.clear_remote_selection(participant);
		}
	}

	/// Dispatches a server message addressed to this document.
	///
	/// # Errors
	///
	/// Whatever the handler for the message returns. A
	/// [`ServerMessage::Error`] is reported as [`ClientError::Rejected`].
	pub fn handle(&mut self, msg: ServerMessage) -> Result<()> {
		match msg {
			ServerMessage::Operation {
				participant,
				operation,
				selection,
				..
			} => {
				self.apply_server(operation)?;
				self.on_remote_selection(participant, selection);
			}
			ServerMessage::Selection {
				participant, selection, ..
			} => self.on_remote_selection(participant, selection),
			ServerMessage::Ack { .. } => self.server_ack()?,
			ServerMessage::ClientJoined { participant, name, .. } => self.on_client_joined(participant, name),
			ServerMessage::SetName { participant, name, .. } => self.on_set_name(participant, name),
			ServerMessage::ClientLeft { participant, .. } => self.on_client_left(participant),
			ServerMessage::Joined { document, .. } => {
				warn!(%document, "client.unexpected_joined");
			}
			ServerMessage::Error { message, .. } => {
				warn!(%message, "client.server_error");
				return Err(ClientError::Rejected(message));
			}
		}
		Ok(())
	}
}

impl<E: EditorAdapter, S: ServerAdapter> ClientCore<E, S> {
	fn send(&mut self, send: Option<Outgoing>) -> Result<()> {
		let Some(Outgoing { revision, operation }) = send else {
			return Ok(());
		};
		trace!(%revision, %operation, "client.send_operation");
		self.server.send_operation(revision, &operation, self.selection.as_ref())
	}

	fn send_selection(&mut self, selection: Option<&Selection>) -> Result<()> {
		// The server would place it against a revision we have not sent yet.
		if self.sync.is_buffering() {
			return Ok(());
		}
		self.server.send_selection(selection)
	}

	/// Moves remote selections past a committed local edit and sends it.
	fn local_edit(&mut self, op: &Operation, send: Option<Outgoing>) -> Result<()> {
		self.roster.transform_selections(op);
		self.redraw_all();
		self.send(send)
	}

	/// Applies an undo or redo entry as a new local edit.
	fn apply_unredo(&mut self, undo: &mut UndoManager, entry: WrappedOperation) -> Result<()> {
		let inverse = entry.invert(&self.editor.value())?;
		let mut sync = self.sync.clone();
		let send = sync.apply_client(entry.operation.clone())?;
		self.editor.apply_operation(&entry.operation)?;
		undo.add(inverse, false)?;
		self.sync = sync;

		let after = entry.meta.after;
		self.editor.set_selection(&after);
		self.selection = Some(after);
		self.local_edit(&entry.operation, send)
	}

	/// Redraws (or clears) one participant's selection.
	fn redraw(&mut self, participant: ParticipantId) {
		match self.roster.get(participant) {
			Some(remote) => match &remote.selection {
				Some(selection) => self.editor.show_remote_selection(participant, selection, &remote.color),
				None => self.editor.clear_remote_selection(participant),
			},
			None => self.editor.clear_remote_selection(participant),
		}
	}

	fn redraw_all(&mut self) {
		for remote in self.roster.iter() {
			if let Some(selection) = &remote.selection {
				self.editor.show_remote_selection(remote.id, selection, &remote.color);
			}
		}
	}
}

/// Checks that a reported change is self-consistent and matches the widget,
/// which already holds `len` characters after it.
fn check_change(op: &Operation, inverse: &Operation, len: usize) -> Result<()> {
	if op.target_len() != len {
		return Err(OperationError::LengthMismatch {
			expected: op.target_len(),
			actual: len,
		}
		.into());
	}
	// The inverse must undo `op` and `op` must redo the inverse.
	if op.target_len() != inverse.base_len() {
		return Err(OperationError::IncompatibleLengths {
			target: op.target_len(),
			base: inverse.base_len(),
		}
		.into());
	}
	if inverse.target_len() != op.base_len() {
		return Err(OperationError::IncompatibleLengths {
			target: inverse.target_len(),
			base: op.base_len(),
		}
		.into());
	}
	Ok(())
}

/// An empty history is not an error for the user pressing undo.
fn ignore_empty(result: Result<()>) -> Result<()> {
	match result {
		Err(ClientError::Undo(UndoError::EmptyStack(kind))) => {
			trace!(%kind, "client.nothing_to_undo");
			Ok(())
		}
		result => result,
	}
}
