//! In-memory text widget.
//!
//! [`HeadlessEditor`] is cheaply cloneable: every clone shares the same
//! buffer, so one clone can be handed to an [`EditorClient`](crate::EditorClient)
//! (or a client task) while another drives edits and inspects the result.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tandem_primitives::{Operation, OperationError, Range, Selection};
use tandem_proto::ParticipantId;

use crate::adapter::EditorAdapter;
use crate::color::ParticipantColor;

/// A remote selection as drawn: each range with the shade it is painted in.
pub type Marks = Vec<(Range, String)>;

#[derive(Debug, Default)]
struct State {
	text: String,
	selection: Selection,
	marks: FxHashMap<ParticipantId, Marks>,
}

/// Shared in-memory buffer implementing [`EditorAdapter`].
#[derive(Debug, Clone, Default)]
pub struct HeadlessEditor {
	state: Arc<Mutex<State>>,
}

impl HeadlessEditor {
	/// Creates a buffer holding `text` with the cursor at the start.
	pub fn new(text: impl Into<String>) -> Self {
		Self {
			state: Arc::new(Mutex::new(State {
				text: text.into(),
				selection: Selection::cursor(0),
				marks: FxHashMap::default(),
			})),
		}
	}

	/// Current content.
	pub fn text(&self) -> String {
		self.state.lock().text.clone()
	}

	/// Performs a user edit: applies `op`, moves the cursor with it and
	/// returns the `(operation, inverse)` pair a widget reports.
	pub fn edit(&self, op: Operation) -> Result<(Operation, Operation), OperationError> {
		let mut state = self.state.lock();
		let inverse = op.invert(&state.text)?;
		state.text = op.apply(&state.text)?;
		state.selection = state.selection.transform(&op);
		Ok((op, inverse))
	}

	/// Types `text` at character offset `at`, leaving the cursor after it.
	pub fn insert(&self, at: usize, text: &str) -> Result<(Operation, Operation), OperationError> {
		let len = self.state.lock().text.chars().count();
		if at > len {
			return Err(OperationError::Overrun);
		}
		self.select(Selection::cursor(at));
		self.edit(Operation::builder().retain(at).insert(text).retain(len - at).build())
	}

	/// Deletes `n` characters starting at offset `at`.
	pub fn delete(&self, at: usize, n: usize) -> Result<(Operation, Operation), OperationError> {
		let len = self.state.lock().text.chars().count();
		if at + n > len {
			return Err(OperationError::Overrun);
		}
		self.select(Selection::cursor(at + n));
		self.edit(Operation::builder().retain(at).delete(n).retain(len - at - n).build())
	}

	/// Moves the local selection as the user would.
	pub fn select(&self, selection: Selection) {
		self.state.lock().selection = selection;
	}

	/// Returns how another participant's selection is currently drawn.
	pub fn marks(&self, participant: ParticipantId) -> Option<Marks> {
		self.state.lock().marks.get(&participant).cloned()
	}
}

impl EditorAdapter for HeadlessEditor {
	fn value(&self) -> String {
		self.text()
	}

	fn set_value(&mut self, text: &str) {
		let mut state = self.state.lock();
		state.text = text.to_owned();
		state.selection = Selection::cursor(0);
	}

	fn apply_operation(&mut self, op: &Operation) -> Result<(), OperationError> {
		let mut state = self.state.lock();
		state.text = op.apply(&state.text)?;
		state.selection = state.selection.transform(op);
		Ok(())
	}

	fn selection(&self) -> Selection {
		self.state.lock().selection.clone()
	}

	fn set_selection(&mut self, selection: &Selection) {
		self.state.lock().selection = selection.clone();
	}

	fn show_remote_selection(&mut self, participant: ParticipantId, selection: &Selection, color: &ParticipantColor) {
		let marks = selection
			.iter()
			.map(|range| (*range, color.for_range(range).to_owned()))
			.collect();
		self.state.lock().marks.insert(participant, marks);
	}

	fn clear_remote_selection(&mut self, participant: ParticipantId) {
		self.state.lock().marks.remove(&participant);
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::config::ColorConfig;

	#[test]
	fn clones_share_the_buffer() {
		let editor = HeadlessEditor::new("hello");
		let mut view = editor.clone();

		editor.insert(5, " world").unwrap();
		assert_eq!(view.value(), "hello world");
		assert_eq!(view.selection(), Selection::cursor(11));

		view.set_value("reset");
		assert_eq!(editor.text(), "reset");
	}

	#[test]
	fn edit_reports_inverse() {
		let editor = HeadlessEditor::new("abcdef");
		let (op, inverse) = editor.delete(1, 3).unwrap();
		assert_eq!(editor.text(), "aef");
		assert_eq!(inverse.apply("aef").unwrap(), "abcdef");
		assert_eq!(op.base_len(), 6);
		assert_eq!(editor.selection(), Selection::cursor(1));
	}

	#[test]
	fn out_of_bounds_edit_is_rejected() {
		let editor = HeadlessEditor::new("ab");
		assert_eq!(editor.insert(3, "x"), Err(OperationError::Overrun));
		assert_eq!(editor.delete(1, 2), Err(OperationError::Overrun));
		assert_eq!(editor.text(), "ab");
	}

	#[test]
	fn remote_marks_use_range_shades() {
		let mut editor = HeadlessEditor::new("abc");
		let color = ParticipantColor::for_name("ada", &ColorConfig::default());
		let selection = Selection::new([Range::point(1), Range::new(0, 2)]);

		editor.show_remote_selection(ParticipantId(3), &selection, &color);
		assert_eq!(
			editor.marks(ParticipantId(3)),
			Some(vec![
				(Range::point(1), "#56df20".to_owned()),
				(Range::new(0, 2), "#e0f2d9".to_owned())
			])
		);

		editor.clear_remote_selection(ParticipantId(3));
		assert_eq!(editor.marks(ParticipantId(3)), None);
	}
}
