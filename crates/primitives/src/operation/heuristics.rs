//! Heuristics deciding whether two consecutive edits belong to one undo step.

use super::{Component, Operation};
use crate::range::CharIdx;

impl Operation {
	/// Returns true if `other`, applied right after `self`, should merge with
	/// it into one undo step.
	///
	/// Typing forward (`"a"` then `"b"` right after it) and deleting either
	/// backwards or forwards from the same point qualify.
	pub fn should_be_composed_with(&self, other: &Operation) -> bool {
		if self.is_noop() || other.is_noop() {
			return true;
		}

		let (Some((start_a, simple_a)), Some((start_b, simple_b))) = (self.simple(), other.simple()) else {
			return false;
		};

		match (simple_a, simple_b) {
			(Component::Insert(a), Component::Insert(_)) => start_a + a.char_len() == start_b,
			(Component::Delete(_), Component::Delete(b)) => start_b + b == start_a || start_a == start_b,
			_ => false,
		}
	}

	/// Like [`should_be_composed_with`](Self::should_be_composed_with), but
	/// for inverses: `self` and `other` are the inverses of the edits, with
	/// the newer edit's inverse first.
	pub fn should_be_composed_with_inverted(&self, other: &Operation) -> bool {
		if self.is_noop() || other.is_noop() {
			return true;
		}

		let (Some((start_a, simple_a)), Some((start_b, simple_b))) = (self.simple(), other.simple()) else {
			return false;
		};

		match (simple_a, simple_b) {
			(Component::Insert(a), Component::Insert(_)) => start_a + a.char_len() == start_b || start_a == start_b,
			(Component::Delete(_), Component::Delete(b)) => start_b + b == start_a,
			_ => false,
		}
	}

	/// Returns the single non-retain primitive of an operation shaped
	/// `[retain] (insert | delete) [retain]`, along with its offset.
	fn simple(&self) -> Option<(CharIdx, &Component)> {
		let start = match self.components.first() {
			Some(Component::Retain(n)) => *n,
			_ => 0,
		};

		let simple = match self.components.as_slice() {
			[only] => only,
			[Component::Retain(_), op] | [op, Component::Retain(_)] => op,
			[Component::Retain(_), op, Component::Retain(_)] => op,
			_ => return None,
		};

		Some((start, simple))
	}
}
