use crate::range::CharLen;

/// Inserted text with its cached character length.
///
/// Storing the character count avoids repeated O(n) `.chars().count()` calls
/// while composing and transforming.
///
/// Fields are private to keep `char_len == text.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
	text: String,
	char_len: CharLen,
}

impl Insertion {
	/// Creates a new insertion, computing the character length once.
	#[inline]
	pub fn new(text: impl Into<String>) -> Self {
		let text = text.into();
		let char_len = text.chars().count();
		Self { text, char_len }
	}

	/// Returns true if this insertion is empty.
	#[inline]
	pub fn is_empty(&self) -> bool {
		self.char_len == 0
	}

	/// Returns the inserted text.
	#[inline]
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the cached character length.
	#[inline]
	pub fn char_len(&self) -> CharLen {
		self.char_len
	}

	/// Appends text from another insertion, updating the cached length.
	pub(super) fn push(&mut self, other: &Insertion) {
		self.text.push_str(&other.text);
		self.char_len += other.char_len;
	}

	/// Splits after the first `n` characters.
	pub(super) fn split_at(self, n: CharLen) -> (Insertion, Insertion) {
		debug_assert!(n <= self.char_len);
		let byte = byte_offset(&self.text, n);
		let (head, tail) = self.text.split_at(byte);
		(
			Insertion {
				text: head.to_owned(),
				char_len: n,
			},
			Insertion {
				text: tail.to_owned(),
				char_len: self.char_len - n,
			},
		)
	}
}

/// A single primitive of an [`Operation`](super::Operation).
///
/// On the wire a retain is a positive integer, an insert a string and a
/// delete a negative integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
	/// Copy the next N characters of the source text.
	Retain(CharLen),
	/// Emit new text at the current position.
	Insert(Insertion),
	/// Drop the next N characters of the source text.
	Delete(CharLen),
}

impl Component {
	/// Characters this component consumes from the source text.
	pub fn base_len(&self) -> CharLen {
		match self {
			Component::Retain(n) | Component::Delete(n) => *n,
			Component::Insert(_) => 0,
		}
	}

	/// Characters this component produces in the target text.
	pub fn target_len(&self) -> CharLen {
		match self {
			Component::Retain(n) => *n,
			Component::Insert(ins) => ins.char_len(),
			Component::Delete(_) => 0,
		}
	}
}

/// Byte offset of the `n`th character of `text`, or `None` past the end.
pub(super) fn checked_byte_offset(text: &str, n: CharLen) -> Option<usize> {
	text.char_indices()
		.map(|(idx, _)| idx)
		.chain(std::iter::once(text.len()))
		.nth(n)
}

fn byte_offset(text: &str, n: CharLen) -> usize {
	checked_byte_offset(text, n).unwrap_or(text.len())
}
