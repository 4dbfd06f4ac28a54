use serde::{Deserialize, Serialize};

use crate::operation::{Component, Operation};

/// A position in the text, measured in characters (not bytes).
///
/// This is the canonical coordinate space for operations and selections.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// A text range defined by anchor and head positions.
///
/// The anchor is the fixed end, and the head moves during selection extension.
/// A range whose ends coincide is a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
	/// The fixed end of the range.
	pub anchor: CharIdx,
	/// The moving end of the range (cursor position).
	pub head: CharIdx,
}

impl Range {
	/// Creates a new range from anchor to head.
	pub fn new(anchor: CharIdx, head: CharIdx) -> Self {
		Self { anchor, head }
	}

	/// Creates a zero-width range (cursor) at the given position.
	pub fn point(pos: CharIdx) -> Self {
		Self::new(pos, pos)
	}

	/// Returns the smaller of anchor and head.
	#[inline]
	pub fn min(&self) -> CharIdx {
		std::cmp::min(self.anchor, self.head)
	}

	/// Returns the larger of anchor and head.
	#[inline]
	pub fn max(&self) -> CharIdx {
		std::cmp::max(self.anchor, self.head)
	}

	/// Returns true if this range is a cursor.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.anchor == self.head
	}

	/// Moves both ends of the range through `op`.
	///
	/// Text inserted at or before an end pushes it right; deleting text that
	/// contains an end collapses it to the start of the deletion.
	pub fn transform(&self, op: &Operation) -> Range {
		let head = transform_index(self.head, op);
		if self.is_empty() {
			return Range::point(head);
		}
		Range::new(transform_index(self.anchor, op), head)
	}
}

/// Maps an offset in the text before `op` to the text after it.
fn transform_index(index: CharIdx, op: &Operation) -> CharIdx {
	let mut new_index = index;
	let mut remaining = index as isize;

	for component in op.components() {
		match component {
			Component::Retain(n) => remaining -= *n as isize,
			Component::Insert(ins) => new_index += ins.char_len(),
			Component::Delete(n) => {
				new_index -= (remaining.max(0) as usize).min(*n);
				remaining -= *n as isize;
			}
		}
		if remaining < 0 {
			break;
		}
	}

	new_index
}
