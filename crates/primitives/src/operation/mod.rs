//! Text operations built from retain, insert and delete primitives.
//!
//! When an operation is applied, an imaginary cursor runs over the source
//! text: retains copy characters, deletes skip them and inserts emit new text
//! without advancing. An operation therefore knows the length of every text it
//! can be applied to ([`Operation::base_len`]) and the length of every text it
//! produces ([`Operation::target_len`]).
//!
//! Operations are kept in canonical form while they are built: adjacent
//! primitives of the same kind merge, and an insert next to a delete is always
//! ordered first. Two operations with the same effect therefore compare equal.

mod component;
mod compose;
mod heuristics;
mod transform;
mod wire;


use std::fmt;

pub use component::{Component, Insertion};
use component::checked_byte_offset;

use crate::error::OperationError;
use crate::range::CharLen;

/// A sequence of primitives turning one text into another.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Operation {
	/// Canonical primitive sequence.
	components: Vec<Component>,
	/// Length of every text this operation applies to.
	base_len: CharLen,
	/// Length of every text this operation produces.
	target_len: CharLen,
}

impl Operation {
	/// Creates an empty operation (the identity on the empty text).
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts building an operation.
	pub fn builder() -> OperationBuilder {
		OperationBuilder::default()
	}

	/// Returns the identity operation on a text of `len` characters.
	pub fn identity(len: CharLen) -> Self {
		let mut op = Self::new();
		op.retain(len);
		op
	}

	/// Returns the primitives of this operation.
	pub fn components(&self) -> &[Component] {
		&self.components
	}

	/// Length of the text this operation can be applied to.
	pub fn base_len(&self) -> CharLen {
		self.base_len
	}

	/// Length of the text this operation produces.
	pub fn target_len(&self) -> CharLen {
		self.target_len
	}

	/// Returns true if applying this operation leaves any compatible text unchanged.
	pub fn is_noop(&self) -> bool {
		matches!(self.components.as_slice(), [] | [Component::Retain(_)])
	}

	/// Appends a retain, merging with a preceding retain.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.base_len += n;
		self.target_len += n;

		if let Some(Component::Retain(count)) = self.components.last_mut() {
			*count += n;
		} else {
			self.components.push(Component::Retain(n));
		}
	}

	/// Appends an insert.
	///
	/// Merges with an adjacent insert, and moves in front of a trailing
	/// delete so that `delete, insert` and `insert, delete` share one form.
	pub(crate) fn insert(&mut self, ins: Insertion) {
		if ins.is_empty() {
			return;
		}

		self.target_len += ins.char_len();

		match self.components.as_mut_slice() {
			[.., Component::Insert(prev)] | [.., Component::Insert(prev), Component::Delete(_)] => {
				prev.push(&ins);
			}
			[.., last @ Component::Delete(_)] => {
				let del = std::mem::replace(last, Component::Insert(ins));
				self.components.push(del);
			}
			_ => {
				self.components.push(Component::Insert(ins));
			}
		}
	}

	/// Appends a delete, merging with a preceding delete.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.base_len += n;

		if let Some(Component::Delete(count)) = self.components.last_mut() {
			*count += n;
		} else {
			self.components.push(Component::Delete(n));
		}
	}

	/// Appends any primitive.
	pub(crate) fn push(&mut self, component: Component) {
		match component {
			Component::Retain(n) => self.retain(n),
			Component::Insert(ins) => self.insert(ins),
			Component::Delete(n) => self.delete(n),
		}
	}

	/// Applies this operation to `text`, returning the new text.
	///
	/// # Errors
	///
	/// [`OperationError::LengthMismatch`] if `text` is not exactly
	/// [`base_len`](Self::base_len) characters long; [`OperationError::Overrun`]
	/// and [`OperationError::Underrun`] if the walk leaves the text's bounds.
	pub fn apply(&self, text: &str) -> Result<String, OperationError> {
		let len = text.chars().count();
		if len != self.base_len {
			return Err(OperationError::LengthMismatch {
				expected: self.base_len,
				actual: len,
			});
		}

		let mut out = String::with_capacity(text.len());
		let mut pos = 0;
		let mut consumed = 0;

		for component in &self.components {
			match component {
				Component::Retain(n) => {
					let end = pos + checked_byte_offset(&text[pos..], *n).ok_or(OperationError::Overrun)?;
					out.push_str(&text[pos..end]);
					pos = end;
					consumed += n;
				}
				Component::Insert(ins) => out.push_str(ins.text()),
				Component::Delete(n) => {
					pos += checked_byte_offset(&text[pos..], *n).ok_or(OperationError::Overrun)?;
					consumed += n;
				}
			}
		}

		if consumed != len {
			return Err(OperationError::Underrun { consumed, len });
		}

		Ok(out)
	}

	/// Computes the operation that reverts this one.
	///
	/// `original` must be the text this operation was applied to: deleted
	/// spans are read back from it and become inserts.
	pub fn invert(&self, original: &str) -> Result<Operation, OperationError> {
		let len = original.chars().count();
		if len != self.base_len {
			return Err(OperationError::LengthMismatch {
				expected: self.base_len,
				actual: len,
			});
		}

		let mut inverse = Operation::new();
		let mut pos = 0;

		for component in &self.components {
			match component {
				Component::Retain(n) => {
					inverse.retain(*n);
					pos += checked_byte_offset(&original[pos..], *n).ok_or(OperationError::Overrun)?;
				}
				Component::Insert(ins) => inverse.delete(ins.char_len()),
				Component::Delete(n) => {
					let end = pos + checked_byte_offset(&original[pos..], *n).ok_or(OperationError::Overrun)?;
					inverse.insert(Insertion::new(&original[pos..end]));
					pos = end;
				}
			}
		}

		Ok(inverse)
	}
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, component) in self.components.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			match component {
				Component::Retain(n) => write!(f, "retain {n}")?,
				Component::Insert(ins) => write!(f, "insert '{}'", ins.text())?,
				Component::Delete(n) => write!(f, "delete {n}")?,
			}
		}
		Ok(())
	}
}

impl FromIterator<Component> for Operation {
	fn from_iter<I: IntoIterator<Item = Component>>(iter: I) -> Self {
		let mut op = Operation::new();
		for component in iter {
			op.push(component);
		}
		op
	}
}

/// Chainable builder that keeps the operation canonical on every append.
///
/// ```
/// use tandem_primitives::Operation;
///
/// let op = Operation::builder().retain(5).insert(" world").build();
/// assert_eq!(op.apply("hello").unwrap(), "hello world");
/// ```
#[derive(Debug, Default, Clone)]
pub struct OperationBuilder {
	operation: Operation,
}

impl OperationBuilder {
	/// Skips over `n` characters.
	#[must_use]
	pub fn retain(mut self, n: CharLen) -> Self {
		self.operation.retain(n);
		self
	}

	/// Inserts `text` at the current position.
	#[must_use]
	pub fn insert(mut self, text: impl Into<String>) -> Self {
		self.operation.insert(Insertion::new(text));
		self
	}

	/// Deletes the next `n` characters.
	#[must_use]
	pub fn delete(mut self, n: CharLen) -> Self {
		self.operation.delete(n);
		self
	}

	/// Finishes the operation.
	pub fn build(self) -> Operation {
		self.operation
	}
}
