// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use dashmap::{DashMap, mapref::entry::Entry};
use pontoon_foreign::{ForeignRef, Session};
use pontoon_type::{
	Fragment, Value,
	diagnostic::table_function::{already_registered, not_registered},
	return_error,
};

use crate::table_function::{TableFunction, TableFunctionMode};

/// Catalog of registered table functions.
///
/// Entries are shared as `Arc`s, so compilations holding a function survive
/// its unregistration; the descriptor record is torn down when the last
/// holder drops it.
pub struct TableFunctionRegistry {
	functions: DashMap<String, Arc<TableFunction>>,
}

impl TableFunctionRegistry {
	pub fn new() -> Self {
		Self {
			functions: DashMap::new(),
		}
	}

	/// Build a table function from a foreign callable and register it
	/// under its name.
	pub fn create_table_function(
		&self,
		session: &Session,
		name: &str,
		callable: ForeignRef,
		parameters: Option<Vec<String>>,
		schema: &ForeignRef,
		mode: &Value,
	) -> crate::Result<Arc<TableFunction>> {
		let mode = TableFunctionMode::from_value(mode)?;
		let function = TableFunction::from_callable(session, name, callable, parameters, schema, mode)?;
		self.register(function)
	}

	pub fn register(&self, function: TableFunction) -> crate::Result<Arc<TableFunction>> {
		let name = function.name.clone();
		let entry = Arc::new(function);

		// Entry-based insertion keeps check-and-insert atomic across
		// concurrently compiling sessions
		match self.functions.entry(name.clone()) {
			Entry::Occupied(_) => {
				return_error!(already_registered(Fragment::internal(name)))
			}
			Entry::Vacant(vacant) => {
				vacant.insert(entry.clone());
			}
		}

		Ok(entry)
	}

	pub fn unregister(&self, name: &str) -> crate::Result<()> {
		if self.functions.remove(name).is_none() {
			return_error!(not_registered(Fragment::internal(name)));
		}
		Ok(())
	}

	pub fn find(&self, name: &str) -> Option<Arc<TableFunction>> {
		self.functions.get(name).map(|entry| entry.value().clone())
	}

	pub fn len(&self) -> usize {
		self.functions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.functions.is_empty()
	}
}

impl Default for TableFunctionRegistry {
	fn default() -> Self {
		Self::new()
	}
}
