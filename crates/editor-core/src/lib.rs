//! Headless editor core: undo history that stays valid while remote edits
//! keep arriving.

/// Undo/redo stacks of inverse operations.
pub mod undo_manager;

pub use undo_manager::{DEFAULT_MAX_ITEMS, HistoryKind, UndoError, UndoManager, UndoMode};
