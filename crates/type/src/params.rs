// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::collections::HashMap;

use crate::Value;

/// Parameters supplied to a query, either positionally or by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
	#[default]
	None,
	Positional(Vec<Value>),
	Named(HashMap<String, Value>),
}

impl Params {
	pub fn get_positional(&self, index: usize) -> Option<&Value> {
		match self {
			Params::Positional(values) => values.get(index),
			_ => None,
		}
	}

	pub fn get_named(&self, name: &str) -> Option<&Value> {
		match self {
			Params::Named(map) => map.get(name),
			_ => None,
		}
	}

	pub fn empty() -> Params {
		Params::None
	}
}

impl From<()> for Params {
	fn from(_: ()) -> Self {
		Params::None
	}
}

impl From<Vec<Value>> for Params {
	fn from(values: Vec<Value>) -> Self {
		Params::Positional(values)
	}
}

impl From<HashMap<String, Value>> for Params {
	fn from(map: HashMap<String, Value>) -> Self {
		Params::Named(map)
	}
}

impl<const N: usize> From<[Value; N]> for Params {
	fn from(values: [Value; N]) -> Self {
		Params::Positional(values.to_vec())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_positional() {
		let params = Params::from(vec![Value::Int4(1), Value::Utf8("x".to_string())]);
		assert_eq!(params.get_positional(0), Some(&Value::Int4(1)));
		assert_eq!(params.get_positional(2), None);
		assert_eq!(params.get_named("x"), None);
	}

	#[test]
	fn test_named() {
		let mut map = HashMap::new();
		map.insert("count".to_string(), Value::Int4(5));
		let params = Params::from(map);
		assert_eq!(params.get_named("count"), Some(&Value::Int4(5)));
		assert_eq!(params.get_positional(0), None);
	}
}
