//! Undo history for a document that other participants edit concurrently.
//!
//! Entries are stored already inverted: undoing means applying the top of the
//! undo stack. Applying an undo produces a new edit whose inverse lands on the
//! redo stack, and vice versa, so the caller records that inverse through
//! [`UndoManager::add`] while the manager is in [`UndoMode::Undoing`] or
//! [`UndoMode::Redoing`].
//!
//! When a remote operation is integrated, every entry is transformed past it
//! so that undo only ever reverts the local participant's own work.


use tandem_primitives::{Metadata, Operation, OperationError, SelectionPair, WrappedOperation};
use thiserror::Error;
use tracing::trace;

/// Default bound on the number of entries per stack.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Which of the two history stacks an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
	Undo,
	Redo,
}

impl std::fmt::Display for HistoryKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			HistoryKind::Undo => "undo",
			HistoryKind::Redo => "redo",
		})
	}
}

/// What the manager is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndoMode {
	/// Recording regular edits.
	#[default]
	Normal,
	/// An undo entry is being applied; the next [`UndoManager::add`] feeds redo.
	Undoing,
	/// A redo entry is being applied; the next [`UndoManager::add`] feeds undo.
	Redoing,
}

/// Errors raised by [`UndoManager`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UndoError {
	/// There is nothing to undo or redo.
	#[error("nothing to {0}")]
	EmptyStack(HistoryKind),

	/// An entry could not be composed or transformed.
	#[error(transparent)]
	Apply(#[from] OperationError),
}

/// Bounded undo and redo stacks of inverse operations.
#[derive(Debug, Clone)]
pub struct UndoManager<M = SelectionPair> {
	max_items: usize,
	undo_stack: Vec<WrappedOperation<M>>,
	redo_stack: Vec<WrappedOperation<M>>,
	mode: UndoMode,
	/// One-shot flag keeping the next edit out of the entry below it.
	dont_compose: bool,
}

impl<M: Metadata> Default for UndoManager<M> {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_ITEMS)
	}
}

impl<M: Metadata> UndoManager<M> {
	/// Creates an empty manager keeping at most `max_items` entries per stack.
	pub fn new(max_items: usize) -> Self {
		Self {
			max_items,
			undo_stack: Vec::new(),
			redo_stack: Vec::new(),
			mode: UndoMode::Normal,
			dont_compose: false,
		}
	}

	/// Returns the current mode.
	pub fn mode(&self) -> UndoMode {
		self.mode
	}

	/// Returns true while an undo entry is being applied.
	pub fn is_undoing(&self) -> bool {
		self.mode == UndoMode::Undoing
	}

	/// Returns true while a redo entry is being applied.
	pub fn is_redoing(&self) -> bool {
		self.mode == UndoMode::Redoing
	}

	/// Returns whether undo is available.
	pub fn can_undo(&self) -> bool {
		!self.undo_stack.is_empty()
	}

	/// Returns whether redo is available.
	pub fn can_redo(&self) -> bool {
		!self.redo_stack.is_empty()
	}

	/// Returns the number of entries in the undo stack.
	pub fn undo_len(&self) -> usize {
		self.undo_stack.len()
	}

	/// Returns the number of entries in the redo stack.
	pub fn redo_len(&self) -> usize {
		self.redo_stack.len()
	}

	/// Returns the entry the next undo would apply.
	pub fn last_undo(&self) -> Option<&WrappedOperation<M>> {
		self.undo_stack.last()
	}

	/// Returns the entry the next redo would apply.
	pub fn last_redo(&self) -> Option<&WrappedOperation<M>> {
		self.redo_stack.last()
	}

	/// Records the inverse of an edit.
	///
	/// In normal mode the entry goes onto the undo stack, merged into the top
	/// entry when `compose` is set and the previous entry did not come from an
	/// undo or redo, and the redo stack is cleared. While undoing or redoing
	/// the entry goes onto the opposite stack and the next normal edit starts
	/// a fresh entry.
	///
	/// # Errors
	///
	/// [`UndoError::Apply`] if `op` does not compose with the top entry; the
	/// stacks are left untouched.
	pub fn add(&mut self, op: WrappedOperation<M>, compose: bool) -> Result<(), UndoError> {
		match self.mode {
			UndoMode::Undoing => {
				trace!(redo_len = self.redo_stack.len() + 1, "undo.add.redo");
				self.redo_stack.push(op);
				self.dont_compose = true;
			}
			UndoMode::Redoing => {
				trace!(undo_len = self.undo_stack.len() + 1, "undo.add.undo_from_redo");
				self.undo_stack.push(op);
				self.dont_compose = true;
			}
			UndoMode::Normal => {
				let merge = compose && !self.dont_compose;
				match self.undo_stack.last_mut() {
					Some(top) if merge => {
						*top = op.compose(top)?;
						trace!(undo_len = self.undo_stack.len(), "undo.add.composed");
					}
					_ => {
						self.undo_stack.push(op);
						trace!(undo_len = self.undo_stack.len(), "undo.add.pushed");
						if self.undo_stack.len() > self.max_items {
							self.undo_stack.remove(0);
						}
					}
				}
				self.dont_compose = false;
				self.redo_stack.clear();
			}
		}
		Ok(())
	}

	/// Re-targets both stacks past a remote operation.
	///
	/// `op` must apply to the document as it is right now. Entries that
	/// become no-ops are dropped.
	///
	/// # Errors
	///
	/// [`UndoError::Apply`] if an entry's length disagrees with `op`; the
	/// stacks are left untouched.
	pub fn transform(&mut self, op: &Operation) -> Result<(), UndoError> {
		let undo_stack = transform_stack(&self.undo_stack, op)?;
		let redo_stack = transform_stack(&self.redo_stack, op)?;
		trace!(
			dropped = self.undo_stack.len() + self.redo_stack.len() - undo_stack.len() - redo_stack.len(),
			"undo.transform"
		);
		self.undo_stack = undo_stack;
		self.redo_stack = redo_stack;
		Ok(())
	}

	/// Pops the top undo entry and hands it to `apply`.
	///
	/// The manager stays in [`UndoMode::Undoing`] while `apply` runs, so the
	/// inverse `apply` records through [`add`](Self::add) feeds the redo stack.
	/// Normal mode is restored whether or not `apply` succeeds.
	///
	/// # Errors
	///
	/// [`UndoError::EmptyStack`] (converted into `E`) if there is nothing to
	/// undo, otherwise whatever `apply` returns.
	pub fn perform_undo<T, E>(
		&mut self,
		apply: impl FnOnce(&mut Self, WrappedOperation<M>) -> Result<T, E>,
	) -> Result<T, E>
	where
		E: From<UndoError>,
	{
		self.perform(HistoryKind::Undo, apply)
	}

	/// Pops the top redo entry and hands it to `apply`.
	///
	/// Mirror image of [`perform_undo`](Self::perform_undo).
	pub fn perform_redo<T, E>(
		&mut self,
		apply: impl FnOnce(&mut Self, WrappedOperation<M>) -> Result<T, E>,
	) -> Result<T, E>
	where
		E: From<UndoError>,
	{
		self.perform(HistoryKind::Redo, apply)
	}

	fn perform<T, E>(
		&mut self,
		kind: HistoryKind,
		apply: impl FnOnce(&mut Self, WrappedOperation<M>) -> Result<T, E>,
	) -> Result<T, E>
	where
		E: From<UndoError>,
	{
		let (mode, entry) = match kind {
			HistoryKind::Undo => (UndoMode::Undoing, self.undo_stack.pop()),
			HistoryKind::Redo => (UndoMode::Redoing, self.redo_stack.pop()),
		};
		let entry = entry.ok_or(UndoError::EmptyStack(kind))?;

		trace!(%kind, "undo.perform");
		self.mode = mode;
		let result = apply(self, entry);
		self.mode = UndoMode::Normal;
		result
	}
}

/// Transforms a stack newest to oldest, carrying `op` down through it.
fn transform_stack<M: Metadata>(
	stack: &[WrappedOperation<M>],
	op: &Operation,
) -> Result<Vec<WrappedOperation<M>>, OperationError> {
	let mut carry = op.clone();
	let mut transformed = Vec::with_capacity(stack.len());

	for entry in stack.iter().rev() {
		let (entry_prime, carry_prime) = entry.transform_against(&carry)?;
		if !entry_prime.operation.is_noop() {
			transformed.push(entry_prime);
		}
		carry = carry_prime;
	}

	transformed.reverse();
	Ok(transformed)
}
