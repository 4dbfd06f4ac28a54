use super::{Component, Operation};
use crate::error::OperationError;

impl Operation {
	/// Combines `self` followed by `other` into a single operation.
	///
	/// `apply(apply(s, self), other) == apply(s, self.compose(other))` for
	/// every text `s` of length [`base_len`](Self::base_len).
	///
	/// # Errors
	///
	/// [`OperationError::IncompatibleLengths`] unless `self.target_len()`
	/// equals `other.base_len()`.
	pub fn compose(&self, other: &Operation) -> Result<Operation, OperationError> {
		if self.target_len != other.base_len {
			return Err(OperationError::IncompatibleLengths {
				target: self.target_len,
				base: other.base_len,
			});
		}

		let mut result = Operation::new();
		let mut a_iter = self.components.iter().cloned();
		let mut b_iter = other.components.iter().cloned();
		let mut a = a_iter.next();
		let mut b = b_iter.next();

		loop {
			match (a.take(), b.take()) {
				(None, None) => break,
				// Deletes of the first operation never reach the second.
				(Some(Component::Delete(n)), rest) => {
					result.delete(n);
					a = a_iter.next();
					b = rest;
				}
				// Inserts of the second operation consume nothing from the first.
				(rest, Some(Component::Insert(ins))) => {
					result.insert(ins);
					a = rest;
					b = b_iter.next();
				}
				(None, Some(_)) | (Some(_), None) => {
					return Err(OperationError::IncompatibleLengths {
						target: self.target_len,
						base: other.base_len,
					});
				}
				(Some(Component::Retain(n)), Some(Component::Retain(m))) => {
					let len = n.min(m);
					result.retain(len);
					a = if n > len { Some(Component::Retain(n - len)) } else { a_iter.next() };
					b = if m > len { Some(Component::Retain(m - len)) } else { b_iter.next() };
				}
				(Some(Component::Insert(ins)), Some(Component::Delete(m))) => {
					let n = ins.char_len();
					let len = n.min(m);
					a = if n > len {
						Some(Component::Insert(ins.split_at(len).1))
					} else {
						a_iter.next()
					};
					b = if m > len { Some(Component::Delete(m - len)) } else { b_iter.next() };
				}
				(Some(Component::Insert(ins)), Some(Component::Retain(m))) => {
					let n = ins.char_len();
					if n > m {
						let (head, tail) = ins.split_at(m);
						result.insert(head);
						a = Some(Component::Insert(tail));
						b = b_iter.next();
					} else {
						result.insert(ins);
						a = a_iter.next();
						b = if m > n { Some(Component::Retain(m - n)) } else { b_iter.next() };
					}
				}
				(Some(Component::Retain(n)), Some(Component::Delete(m))) => {
					let len = n.min(m);
					result.delete(len);
					a = if n > len { Some(Component::Retain(n - len)) } else { a_iter.next() };
					b = if m > len { Some(Component::Delete(m - len)) } else { b_iter.next() };
				}
			}
		}

		Ok(result)
	}
}
