use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::error::WireError;
use crate::operation::Operation;
use crate::range::{CharIdx, Range};

#[cfg(test)]
mod tests;

/// An ordered list of ranges.
///
/// Unlike an editor's working selection, ranges are neither sorted nor merged:
/// a selection received from another participant is displayed exactly as sent,
/// and transforming it keeps every range in place.
///
/// On the wire a selection is `{"ranges": [{"anchor": a, "head": h}, ...]}`.
/// An empty range list is accepted and means nothing is shown; a widget that
/// has no selection at all is reported as `None` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
	ranges: SmallVec<[Range; 1]>,
}

impl Selection {
	/// Creates a selection from the given ranges, keeping their order.
	pub fn new(ranges: impl IntoIterator<Item = Range>) -> Self {
		Self {
			ranges: ranges.into_iter().collect(),
		}
	}

	/// Creates a single-range selection.
	pub fn single(anchor: CharIdx, head: CharIdx) -> Self {
		Self {
			ranges: smallvec![Range::new(anchor, head)],
		}
	}

	/// Creates a selection holding one cursor.
	pub fn cursor(pos: CharIdx) -> Self {
		Self::single(pos, pos)
	}

	/// Returns all ranges as a slice.
	pub fn ranges(&self) -> &[Range] {
		&self.ranges
	}

	/// Returns the number of ranges.
	pub fn len(&self) -> usize {
		self.ranges.len()
	}

	/// Returns true if the selection holds no ranges.
	pub fn is_empty(&self) -> bool {
		self.ranges.is_empty()
	}

	/// Iterates over all ranges.
	pub fn iter(&self) -> impl Iterator<Item = &Range> {
		self.ranges.iter()
	}

	/// Returns true if any range spans at least one character.
	pub fn something_selected(&self) -> bool {
		self.ranges.iter().any(|r| !r.is_empty())
	}

	/// Moves every range through `op`, preserving order and count.
	pub fn transform(&self, op: &Operation) -> Selection {
		Self {
			ranges: self.ranges.iter().map(|r| r.transform(op)).collect(),
		}
	}

	/// Returns the selection with the later one's ranges taking over.
	///
	/// Selections carry no history of their own, so composing them simply
	/// keeps the newer state.
	pub fn compose(&self, other: &Selection) -> Selection {
		other.clone()
	}

	/// Decodes a selection from its JSON object form.
	pub fn from_json(value: &serde_json::Value) -> Result<Selection, WireError> {
		Ok(Selection::deserialize(value)?)
	}
}

impl FromIterator<Range> for Selection {
	fn from_iter<I: IntoIterator<Item = Range>>(iter: I) -> Self {
		Self::new(iter)
	}
}
