use super::{Component, Operation};
use crate::error::OperationError;

impl Operation {
	/// Transforms two concurrent operations against each other.
	///
	/// Both operations must apply to the same text. Returns `(a', b')` such
	/// that applying `a` then `b'` yields the same text as applying `b` then
	/// `a'`. When both insert at the same position, `a`'s text lands first.
	///
	/// # Errors
	///
	/// [`OperationError::IncompatibleOperations`] if the base lengths differ.
	pub fn transform(a: &Operation, b: &Operation) -> Result<(Operation, Operation), OperationError> {
		let mismatch = || OperationError::IncompatibleOperations {
			left: a.base_len,
			right: b.base_len,
		};

		if a.base_len != b.base_len {
			return Err(mismatch());
		}

		let mut a_prime = Operation::new();
		let mut b_prime = Operation::new();
		let mut a_iter = a.components.iter().cloned();
		let mut b_iter = b.components.iter().cloned();
		let mut next_a = a_iter.next();
		let mut next_b = b_iter.next();

		loop {
			match (next_a.take(), next_b.take()) {
				(None, None) => break,
				(Some(Component::Insert(ins)), rest) => {
					b_prime.retain(ins.char_len());
					a_prime.insert(ins);
					next_a = a_iter.next();
					next_b = rest;
				}
				(rest, Some(Component::Insert(ins))) => {
					a_prime.retain(ins.char_len());
					b_prime.insert(ins);
					next_a = rest;
					next_b = b_iter.next();
				}
				(None, Some(_)) | (Some(_), None) => return Err(mismatch()),
				(Some(Component::Retain(n)), Some(Component::Retain(m))) => {
					let len = n.min(m);
					a_prime.retain(len);
					b_prime.retain(len);
					next_a = if n > len { Some(Component::Retain(n - len)) } else { a_iter.next() };
					next_b = if m > len { Some(Component::Retain(m - len)) } else { b_iter.next() };
				}
				// Both sides removed the same span; neither prime needs to.
				(Some(Component::Delete(n)), Some(Component::Delete(m))) => {
					let len = n.min(m);
					next_a = if n > len { Some(Component::Delete(n - len)) } else { a_iter.next() };
					next_b = if m > len { Some(Component::Delete(m - len)) } else { b_iter.next() };
				}
				(Some(Component::Delete(n)), Some(Component::Retain(m))) => {
					let len = n.min(m);
					a_prime.delete(len);
					next_a = if n > len { Some(Component::Delete(n - len)) } else { a_iter.next() };
					next_b = if m > len { Some(Component::Retain(m - len)) } else { b_iter.next() };
				}
				(Some(Component::Retain(n)), Some(Component::Delete(m))) => {
					let len = n.min(m);
					b_prime.delete(len);
					next_a = if n > len { Some(Component::Retain(n - len)) } else { a_iter.next() };
					next_b = if m > len { Some(Component::Delete(m - len)) } else { b_iter.next() };
				}
			}
		}

		Ok((a_prime, b_prime))
	}
}
