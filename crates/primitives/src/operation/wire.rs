//! JSON encoding of operations.
//!
//! An operation is an array whose elements are positive integers (retain),
//! strings (insert) or negative integers (delete). Zero and every other JSON
//! value are rejected.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Component, Insertion, Operation};
use crate::error::WireError;
use crate::range::CharLen;

impl Serialize for Component {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Component::Retain(n) => serializer.serialize_u64(*n as u64),
			Component::Insert(ins) => serializer.serialize_str(ins.text()),
			Component::Delete(n) => serializer.serialize_i64(-(*n as i64)),
		}
	}
}

struct ComponentVisitor;

impl<'de> Visitor<'de> for ComponentVisitor {
	type Value = Component;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("a non-zero integer or a non-empty string")
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> Result<Component, E> {
		if v == 0 {
			return Err(E::invalid_value(de::Unexpected::Unsigned(0), &self));
		}
		CharLen::try_from(v)
			.map(Component::Retain)
			.map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> Result<Component, E> {
		match v {
			0 => Err(E::invalid_value(de::Unexpected::Signed(0), &self)),
			1.. => self.visit_u64(v as u64),
			_ => CharLen::try_from(v.unsigned_abs())
				.map(Component::Delete)
				.map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self)),
		}
	}

	fn visit_str<E: de::Error>(self, v: &str) -> Result<Component, E> {
		if v.is_empty() {
			return Err(E::invalid_value(de::Unexpected::Str(v), &self));
		}
		Ok(Component::Insert(Insertion::new(v)))
	}

	fn visit_string<E: de::Error>(self, v: String) -> Result<Component, E> {
		if v.is_empty() {
			return Err(E::invalid_value(de::Unexpected::Str(&v), &self));
		}
		Ok(Component::Insert(Insertion::new(v)))
	}
}

impl<'de> Deserialize<'de> for Component {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_any(ComponentVisitor)
	}
}

impl Serialize for Operation {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut seq = serializer.serialize_seq(Some(self.components.len()))?;
		for component in &self.components {
			seq.serialize_element(component)?;
		}
		seq.end()
	}
}

struct OperationVisitor;

impl<'de> Visitor<'de> for OperationVisitor {
	type Value = Operation;

	fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("an array of operation components")
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Operation, A::Error> {
		let mut op = Operation::new();
		while let Some(component) = seq.next_element::<Component>()? {
			op.push(component);
		}
		Ok(op)
	}
}

impl<'de> Deserialize<'de> for Operation {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_seq(OperationVisitor)
	}
}

impl Operation {
	/// Encodes this operation as a JSON array.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::Value::Array(
			self.components
				.iter()
				.map(|component| match component {
					Component::Retain(n) => serde_json::Value::from(*n as u64),
					Component::Insert(ins) => serde_json::Value::from(ins.text()),
					Component::Delete(n) => serde_json::Value::from(-(*n as i64)),
				})
				.collect(),
		)
	}

	/// Decodes an operation from its JSON array form.
	pub fn from_json(value: &serde_json::Value) -> Result<Operation, WireError> {
		Ok(Operation::deserialize(value)?)
	}
}
