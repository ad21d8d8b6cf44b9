// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Bridge that lets a foreign, dynamically-typed callable act as a native
//! vectorized table function.
//!
//! A registered callable runs exactly once per query invocation, during
//! init-global. In `tuples` mode the result is iterated row by row, one
//! batch per scan call; in `arrow_table` mode the result is retained and
//! delegated to the columnar-scan library through its own bind/global/local
//! protocol. All foreign-object access happens under the interpreter lock.

mod arrow;
mod bind;
mod call;
mod registry;
mod scan;
mod tuples;

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

pub use arrow::{ArrowGlobalState, ArrowLocalState};
pub use bind::{BindData, TableFunctionBindInput, bind};
use indexmap::IndexMap;
use pontoon_foreign::{ForeignRef, ForeignRuntime, Session};
use pontoon_type::{
	Fragment, Type, Value,
	diagnostic::{
		ast::unrecognized_type,
		table_function::{schema_empty, schema_entry_bare_string, schema_entry_not_pair, unknown_mode},
	},
	err, return_error,
};
pub use registry::TableFunctionRegistry;
pub use scan::{
	TableFunctionGlobalState, TableFunctionInitInput, TableFunctionLocalState, TableFunctionScanNode, init_global,
	init_local, scan,
};
pub use tuples::TuplesGlobalState;

/// How the callable's result is consumed. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFunctionMode {
	/// The result is an iterable of row objects, pulled one batch at a
	/// time.
	Tuples,
	/// The result is a columnar dataset, delegated to the columnar-scan
	/// library.
	ArrowTable,
}

impl TableFunctionMode {
	/// Parse a mode literal. The empty string defaults to tuples;
	/// matching is case-insensitive.
	pub fn parse_str(mode: &str) -> crate::Result<Self> {
		let lower = mode.to_lowercase();
		if lower.is_empty() || lower == "tuples" {
			Ok(TableFunctionMode::Tuples)
		} else if lower == "arrow_table" {
			Ok(TableFunctionMode::ArrowTable)
		} else {
			err!(unknown_mode(mode))
		}
	}

	pub fn parse_integer(mode: i128) -> crate::Result<Self> {
		match mode {
			0 => Ok(TableFunctionMode::Tuples),
			1 => Ok(TableFunctionMode::ArrowTable),
			other => err!(unknown_mode(other.to_string())),
		}
	}

	/// Accept the registration surface forms: a string literal or an
	/// integer in any width.
	pub fn from_value(mode: &Value) -> crate::Result<Self> {
		match mode {
			Value::Utf8(s) => Self::parse_str(s),
			other => match other.as_signed() {
				Some(v) => Self::parse_integer(v),
				None => err!(unknown_mode(other.to_string())),
			},
		}
	}
}

impl Display for TableFunctionMode {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TableFunctionMode::Tuples => f.write_str("tuples"),
			TableFunctionMode::ArrowTable => f.write_str("arrow_table"),
		}
	}
}

/// The shared descriptor record behind a registered table function.
///
/// Holds the foreign callable and the declared schema for the lifetime of
/// the catalog entry. The callable is released under the interpreter lock,
/// exactly once, when the last reference drops.
pub struct TableFunctionInfo {
	name: String,
	callable: Option<ForeignRef>,
	return_types: Vec<Type>,
	return_names: Vec<String>,
	mode: TableFunctionMode,
	runtime: Arc<dyn ForeignRuntime>,
}

impl TableFunctionInfo {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn return_types(&self) -> &[Type] {
		&self.return_types
	}

	pub fn return_names(&self) -> &[String] {
		&self.return_names
	}

	pub fn mode(&self) -> TableFunctionMode {
		self.mode
	}

	pub(crate) fn callable(&self) -> &ForeignRef {
		// Present from construction until drop
		self.callable.as_ref().unwrap()
	}
}

impl Drop for TableFunctionInfo {
	fn drop(&mut self) {
		if let Some(callable) = self.callable.take() {
			let _guard = self.runtime.lock().acquire();
			drop(callable);
		}
	}
}

/// A registered table function: the declared parameter surface plus the
/// shared descriptor record.
pub struct TableFunction {
	pub name: String,
	/// The variadic positional parameter; any type is accepted.
	pub varargs: Option<Type>,
	/// Declared named parameters, all untyped; argument values are
	/// validated by the conversion layer at call time.
	pub named_parameters: IndexMap<String, Type>,
	pub info: Option<Arc<TableFunctionInfo>>,
}

impl std::fmt::Debug for TableFunction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TableFunction")
			.field("name", &self.name)
			.field("varargs", &self.varargs)
			.field("named_parameters", &self.named_parameters)
			.field("has_info", &self.info.is_some())
			.finish()
	}
}

impl TableFunction {
	/// Build a table function from a foreign callable and a declared
	/// schema.
	///
	/// The schema is a foreign sequence of two-element `[name, type]`
	/// entries and is introspected under the interpreter lock, since
	/// registration arrives from the foreign side.
	pub fn from_callable(
		session: &Session,
		name: impl Into<String>,
		callable: ForeignRef,
		parameters: Option<Vec<String>>,
		schema: &ForeignRef,
		mode: TableFunctionMode,
	) -> crate::Result<Self> {
		let name = name.into();
		let runtime = session.runtime().clone();

		let mut return_names = Vec::new();
		let mut return_types = Vec::new();
		{
			let guard = runtime.lock().acquire();

			let mut entries = match schema.iterate(&guard) {
				Ok(entries) => entries,
				Err(_) => return_error!(schema_entry_not_pair()),
			};
			loop {
				let entry = match entries.advance(&guard) {
					Ok(Some(entry)) => entry,
					Ok(None) => break,
					Err(_) => return_error!(schema_entry_not_pair()),
				};
				if let Some(text) = entry.as_str(&guard) {
					return_error!(schema_entry_bare_string(text));
				}
				if entry.len(&guard).unwrap_or(0) < 2 {
					return_error!(schema_entry_not_pair());
				}

				let Ok(name_obj) = entry.get_index(&guard, 0) else {
					return_error!(schema_entry_not_pair());
				};
				let Some(column_name) = name_obj.as_str(&guard) else {
					return_error!(schema_entry_not_pair());
				};

				let Ok(type_obj) = entry.get_index(&guard, 1) else {
					return_error!(schema_entry_not_pair());
				};
				let Some(type_name) = type_obj.as_str(&guard) else {
					return_error!(schema_entry_not_pair());
				};
				let Ok(column_type) = type_name.parse::<Type>() else {
					return_error!(unrecognized_type(Fragment::internal(type_name)));
				};

				return_names.push(column_name);
				return_types.push(column_type);
			}
		}

		if return_types.is_empty() {
			return_error!(schema_empty(Fragment::internal(name)));
		}

		// kwargs surface: the reserved "args" parameter plus one entry
		// per declared parameter name, all untyped
		let mut named_parameters = IndexMap::new();
		named_parameters.insert("args".to_string(), Type::Any);
		if let Some(parameters) = parameters {
			for parameter in parameters {
				named_parameters.insert(parameter, Type::Any);
			}
		}

		let info = TableFunctionInfo {
			name: name.clone(),
			callable: Some(callable),
			return_types,
			return_names,
			mode,
			runtime,
		};

		Ok(TableFunction {
			name,
			varargs: Some(Type::Any),
			named_parameters,
			info: Some(Arc::new(info)),
		})
	}

	pub fn mode(&self) -> Option<TableFunctionMode> {
		self.info.as_ref().map(|info| info.mode())
	}
}
