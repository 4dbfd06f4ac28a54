use crate::error::OperationError;
use crate::operation::Operation;
use crate::selection::Selection;

/// Data that travels with an operation through the algebra.
///
/// Every method has a pass-through default, so metadata that does not care
/// about an algebra step only implements the steps it does.
pub trait Metadata: Clone {
	/// Combines this metadata with that of the operation applied after it.
	///
	/// Defaults to keeping the later metadata.
	fn compose(&self, other: &Self) -> Self {
		other.clone()
	}

	/// Metadata for the inverse operation.
	fn invert(&self) -> Self {
		self.clone()
	}

	/// Re-targets this metadata past a concurrent operation.
	fn transform(&self, _op: &Operation) -> Self {
		self.clone()
	}
}

impl Metadata for () {}

/// The local selection just before and just after an edit.
///
/// Undo restores `after` of the popped entry, which (because entries are
/// stored inverted) is the selection from before the original edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPair {
	/// Selection before the operation was applied.
	pub before: Selection,
	/// Selection after the operation was applied.
	pub after: Selection,
}

impl SelectionPair {
	/// Creates a pair from the selections around an edit.
	pub fn new(before: Selection, after: Selection) -> Self {
		Self { before, after }
	}
}

impl Metadata for SelectionPair {
	fn compose(&self, other: &Self) -> Self {
		Self {
			before: self.before.clone(),
			after: other.after.clone(),
		}
	}

	fn invert(&self) -> Self {
		Self {
			before: self.after.clone(),
			after: self.before.clone(),
		}
	}

	fn transform(&self, op: &Operation) -> Self {
		Self {
			before: self.before.transform(op),
			after: self.after.transform(op),
		}
	}
}

/// An operation paired with metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedOperation<M = SelectionPair> {
	/// The wrapped operation.
	pub operation: Operation,
	/// Metadata that follows the operation.
	pub meta: M,
}

impl<M: Metadata> WrappedOperation<M> {
	/// Wraps `operation` with `meta`.
	pub fn new(operation: Operation, meta: M) -> Self {
		Self { operation, meta }
	}

	/// Applies the inner operation to `text`.
	pub fn apply(&self, text: &str) -> Result<String, OperationError> {
		self.operation.apply(text)
	}

	/// Inverts the operation against `original` and the metadata with it.
	pub fn invert(&self, original: &str) -> Result<Self, OperationError> {
		Ok(Self {
			operation: self.operation.invert(original)?,
			meta: self.meta.invert(),
		})
	}

	/// Composes operations and metadata.
	pub fn compose(&self, other: &Self) -> Result<Self, OperationError> {
		Ok(Self {
			operation: self.operation.compose(&other.operation)?,
			meta: self.meta.compose(&other.meta),
		})
	}

	/// Transforms two concurrent wrapped operations.
	///
	/// Each side's metadata is moved through the other side's original operation.
	pub fn transform(a: &Self, b: &Self) -> Result<(Self, Self), OperationError> {
		let (a_prime, b_prime) = Operation::transform(&a.operation, &b.operation)?;
		Ok((
			Self {
				operation: a_prime,
				meta: a.meta.transform(&b.operation),
			},
			Self {
				operation: b_prime,
				meta: b.meta.transform(&a.operation),
			},
		))
	}

	/// Transforms against a bare concurrent operation, returning this
	/// operation's transformed form and the other side's.
	pub fn transform_against(&self, op: &Operation) -> Result<(Self, Operation), OperationError> {
		let (own_prime, op_prime) = Operation::transform(&self.operation, op)?;
		Ok((
			Self {
				operation: own_prime,
				meta: self.meta.transform(op),
			},
			op_prime,
		))
	}
}
