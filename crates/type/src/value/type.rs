// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fmt::{Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::Value;

/// All possible engine data types
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Type {
	/// A boolean: true or false.
	Bool,
	/// A 4-byte floating point
	Float4,
	/// An 8-byte floating point
	Float8,
	/// A 1-byte signed integer
	Int1,
	/// A 2-byte signed integer
	Int2,
	/// A 4-byte signed integer
	Int4,
	/// An 8-byte signed integer
	Int8,
	/// A 16-byte signed integer
	Int16,
	/// A UTF-8 encoded text
	Utf8,
	/// A 1-byte unsigned integer
	Uint1,
	/// A 2-byte unsigned integer
	Uint2,
	/// A 4-byte unsigned integer
	Uint4,
	/// An 8-byte unsigned integer
	Uint8,
	/// A 16-byte unsigned integer
	Uint16,
	/// Accepts any type; used for untyped function parameters
	Any,
	/// Value is not defined (think null in common programming languages)
	Undefined,
}

impl Type {
	pub fn is_number(&self) -> bool {
		matches!(
			self,
			Type::Float4
				| Type::Float8 | Type::Int1
				| Type::Int2 | Type::Int4
				| Type::Int8 | Type::Int16
				| Type::Uint1 | Type::Uint2
				| Type::Uint4 | Type::Uint8
				| Type::Uint16
		)
	}

	pub fn is_bool(&self) -> bool {
		matches!(self, Type::Bool)
	}

	pub fn is_signed_integer(&self) -> bool {
		matches!(self, Type::Int1 | Type::Int2 | Type::Int4 | Type::Int8 | Type::Int16)
	}

	pub fn is_unsigned_integer(&self) -> bool {
		matches!(self, Type::Uint1 | Type::Uint2 | Type::Uint4 | Type::Uint8 | Type::Uint16)
	}

	pub fn is_integer(&self) -> bool {
		self.is_signed_integer() || self.is_unsigned_integer()
	}

	pub fn is_floating_point(&self) -> bool {
		matches!(self, Type::Float4 | Type::Float8)
	}

	pub fn is_utf8(&self) -> bool {
		matches!(self, Type::Utf8)
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Bool => f.write_str("Bool"),
			Type::Float4 => f.write_str("Float4"),
			Type::Float8 => f.write_str("Float8"),
			Type::Int1 => f.write_str("Int1"),
			Type::Int2 => f.write_str("Int2"),
			Type::Int4 => f.write_str("Int4"),
			Type::Int8 => f.write_str("Int8"),
			Type::Int16 => f.write_str("Int16"),
			Type::Utf8 => f.write_str("Utf8"),
			Type::Uint1 => f.write_str("Uint1"),
			Type::Uint2 => f.write_str("Uint2"),
			Type::Uint4 => f.write_str("Uint4"),
			Type::Uint8 => f.write_str("Uint8"),
			Type::Uint16 => f.write_str("Uint16"),
			Type::Any => f.write_str("Any"),
			Type::Undefined => f.write_str("Undefined"),
		}
	}
}

impl From<&Value> for Type {
	fn from(value: &Value) -> Self {
		match value {
			Value::Undefined => Type::Undefined,
			Value::Boolean(_) => Type::Bool,
			Value::Float4(_) => Type::Float4,
			Value::Float8(_) => Type::Float8,
			Value::Int1(_) => Type::Int1,
			Value::Int2(_) => Type::Int2,
			Value::Int4(_) => Type::Int4,
			Value::Int8(_) => Type::Int8,
			Value::Int16(_) => Type::Int16,
			Value::Utf8(_) => Type::Utf8,
			Value::Uint1(_) => Type::Uint1,
			Value::Uint2(_) => Type::Uint2,
			Value::Uint4(_) => Type::Uint4,
			Value::Uint8(_) => Type::Uint8,
			Value::Uint16(_) => Type::Uint16,
		}
	}
}

impl FromStr for Type {
	type Err = ();

	// Accepts both native names and the common SQL aliases a foreign
	// registration is likely to declare.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_uppercase().as_str() {
			"BOOL" | "BOOLEAN" => Ok(Type::Bool),
			"FLOAT4" | "FLOAT" | "REAL" => Ok(Type::Float4),
			"FLOAT8" | "DOUBLE" => Ok(Type::Float8),
			"INT1" | "TINYINT" => Ok(Type::Int1),
			"INT2" | "SMALLINT" => Ok(Type::Int2),
			"INT4" | "INT" | "INTEGER" => Ok(Type::Int4),
			"INT8" | "BIGINT" => Ok(Type::Int8),
			"INT16" | "HUGEINT" => Ok(Type::Int16),
			"UTF8" | "TEXT" | "VARCHAR" | "STRING" => Ok(Type::Utf8),
			"UINT1" | "UTINYINT" => Ok(Type::Uint1),
			"UINT2" | "USMALLINT" => Ok(Type::Uint2),
			"UINT4" | "UINTEGER" => Ok(Type::Uint4),
			"UINT8" | "UBIGINT" => Ok(Type::Uint8),
			"UINT16" | "UHUGEINT" => Ok(Type::Uint16),
			"ANY" => Ok(Type::Any),
			"UNDEFINED" => Ok(Type::Undefined),
			_ => Err(()),
		}
	}
}
