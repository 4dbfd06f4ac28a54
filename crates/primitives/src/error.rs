//! Error types for the operation algebra and its wire encoding.

use thiserror::Error;

use crate::range::CharLen;

/// Errors raised when an operation does not fit the text or operation it is
/// combined with.
///
/// Every variant means the two sides disagree about which document revision
/// they describe. Callers must not commit partial results after one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
	/// The text length differs from the operation's base length.
	#[error("operation expects a text of length {expected}, got {actual}")]
	LengthMismatch {
		/// Base length of the operation.
		expected: CharLen,
		/// Length of the text it was applied to.
		actual: CharLen,
	},

	/// A retain or delete reached past the end of the text.
	#[error("operation can't retain more characters than are left in the text")]
	Overrun,

	/// The operation finished before consuming the whole text.
	#[error("operation consumed {consumed} of {len} characters")]
	Underrun {
		/// Characters consumed by the operation.
		consumed: CharLen,
		/// Length of the text.
		len: CharLen,
	},

	/// The first operation's target length differs from the second's base length.
	#[error("cannot compose: target length {target} differs from base length {base}")]
	IncompatibleLengths {
		/// Target length of the first operation.
		target: CharLen,
		/// Base length of the second operation.
		base: CharLen,
	},

	/// Two concurrent operations were based on different document lengths.
	#[error("cannot transform operations with base lengths {left} and {right}")]
	IncompatibleOperations {
		/// Base length of the left operation.
		left: CharLen,
		/// Base length of the right operation.
		right: CharLen,
	},
}

/// Errors raised while decoding the JSON encoding of operations and selections.
#[derive(Debug, Error)]
pub enum WireError {
	/// Malformed JSON or a value of the wrong shape.
	#[error("invalid wire value: {0}")]
	Json(#[from] serde_json::Error),
}
