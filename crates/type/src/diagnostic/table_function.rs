// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::{Diagnostic, Fragment};

/// Schema declared at registration contains no columns
pub fn schema_empty(function: Fragment) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_001".to_string(),
		statement: None,
		message: format!("Table function {} schema cannot be empty", name),
		column: None,
		fragment: function,
		label: Some("empty schema".to_string()),
		help: Some("declare at least one [name, type] pair".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A schema entry was a bare string instead of a [name, type] pair
pub fn schema_entry_bare_string(entry: impl Into<String>) -> Diagnostic {
	let entry = entry.into();
	Diagnostic {
		code: "TVF_002".to_string(),
		statement: None,
		message: format!("Invalid schema format: expected [name, type] pairs, got string '{}'", entry),
		column: None,
		fragment: Fragment::internal(entry),
		label: Some("bare string schema entry".to_string()),
		help: Some("wrap the entry as a pair, e.g. [\"name\", \"VARCHAR\"]".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A schema entry does not expose a [name, type] pair shape
pub fn schema_entry_not_pair() -> Diagnostic {
	Diagnostic {
		code: "TVF_003".to_string(),
		statement: None,
		message: "Invalid schema format: each schema item must be a [name, type] pair".to_string(),
		column: None,
		fragment: Fragment::None,
		label: Some("malformed schema entry".to_string()),
		help: Some("each entry needs a column name and a type name".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Mode literal is neither "tuples"/"arrow_table" nor 0/1
pub fn unknown_mode(value: impl Into<String>) -> Diagnostic {
	let value = value.into();
	Diagnostic {
		code: "TVF_004".to_string(),
		statement: None,
		message: format!("'{}' is not a recognized mode for a table function", value),
		column: None,
		fragment: Fragment::internal(value),
		label: Some("unknown mode".to_string()),
		help: Some("use \"tuples\" (or 0) for row iteration, \"arrow_table\" (or 1) for a columnar stream"
			.to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The descriptor's stored record is absent; internal wiring invariant
pub fn missing_function_info(function: Fragment) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_005".to_string(),
		statement: None,
		message: format!("Table function {} missing function info", name),
		column: None,
		fragment: function,
		label: Some("internal error".to_string()),
		help: Some("this is likely a bug, please report it".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The foreign callable produced no usable result
pub fn null_result(function: Fragment) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_006".to_string(),
		statement: None,
		message: format!("Table function {} returned none, expected an iterable or a columnar stream", name),
		column: None,
		fragment: function,
		label: Some("no result".to_string()),
		help: Some("return a sequence of rows or a columnar dataset from the callable".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The result of a tuples-mode callable does not support iteration
pub fn not_iterable(function: Fragment, error: impl Into<String>) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_007".to_string(),
		statement: None,
		message: format!("Table function {} returned non-iterable result: {}", name, error.into()),
		column: None,
		fragment: function,
		label: Some("not iterable".to_string()),
		help: Some("tuples mode requires the callable to return an iterable of row objects".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Indexing into or converting a pulled row failed mid-scan
pub fn invalid_row(function: Fragment, error: impl Into<String>) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_008".to_string(),
		statement: None,
		message: format!("Table function {} returned invalid data: {}", name, error.into()),
		column: None,
		fragment: function,
		label: Some("invalid row".to_string()),
		help: Some("each yielded row must be indexable by position and match the declared column types"
			.to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A function with the same name is already registered
pub fn already_registered(function: Fragment) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_009".to_string(),
		statement: None,
		message: format!("Table function {} is already registered", name),
		column: None,
		fragment: function,
		label: Some("duplicate registration".to_string()),
		help: Some("unregister the existing function first".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// No function with this name is registered
pub fn not_registered(function: Fragment) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_010".to_string(),
		statement: None,
		message: format!("Table function {} is not registered", name),
		column: None,
		fragment: function,
		label: Some("unknown table function".to_string()),
		help: Some("check the function name and registered functions".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// An argument could not be converted to its foreign form
pub fn argument_conversion_failed(function: Fragment, argument: impl Into<String>, error: impl Into<String>) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_011".to_string(),
		statement: None,
		message: format!(
			"Table function {} argument {} could not be converted: {}",
			name,
			argument.into(),
			error.into()
		),
		column: None,
		fragment: function,
		label: Some("argument conversion failed".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The foreign side raised an error during the call or iteration
pub fn foreign_execution_failed(function: Fragment, error: impl Into<String>) -> Diagnostic {
	let name = function.text().to_string();
	Diagnostic {
		code: "TVF_012".to_string(),
		statement: None,
		message: format!("Table function {} execution failed: {}", name, error.into()),
		column: None,
		fragment: function,
		label: Some("execution failed".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}
