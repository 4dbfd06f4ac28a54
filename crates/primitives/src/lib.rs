//! Core types for collaborative text editing: operations, ranges, selections
//! and operation metadata.

/// Error types for applying and combining operations.
pub mod error;
/// Retain/insert/delete operations and their transformation algebra.
pub mod operation;
/// Cursor and selection ranges measured in characters.
pub mod range;
/// Multi-range selections.
pub mod selection;
/// Operations paired with metadata that follows them through the algebra.
pub mod wrapped;

pub use error::{OperationError, WireError};
pub use operation::{Component, Insertion, Operation, OperationBuilder};
pub use range::{CharIdx, CharLen, Range};
pub use selection::Selection;
pub use wrapped::{Metadata, SelectionPair, WrappedOperation};
