// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use indexmap::IndexMap;
use pontoon_foreign::ForeignRef;
use pontoon_type::{Fragment, Type, Value, diagnostic::table_function::missing_function_info, return_error};
use tracing::instrument;

use crate::{
	execute::QueryContext,
	table_function::{TableFunction, TableFunctionMode},
};

/// Call-site arguments for one query compilation of a table function.
pub struct TableFunctionBindInput<'a> {
	pub function: &'a TableFunction,
	pub args: Vec<Value>,
	pub named: IndexMap<String, Value>,
}

/// Bind-time data for one invocation: the call-site arguments, the resolved
/// schema and a handle to the descriptor's callable. Created once per query
/// compilation, immutable, shared by reference with the invocation states.
pub struct BindData {
	pub func_name: String,
	pub args: Vec<Value>,
	pub named: IndexMap<String, Value>,
	pub return_types: Vec<Type>,
	pub return_names: Vec<String>,
	pub mode: TableFunctionMode,
	callable: ForeignRef,
}

impl std::fmt::Debug for BindData {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("BindData")
			.field("func_name", &self.func_name)
			.field("args", &self.args)
			.field("named", &self.named)
			.field("return_types", &self.return_types)
			.field("return_names", &self.return_names)
			.field("mode", &self.mode)
			.finish_non_exhaustive()
	}
}

impl BindData {
	pub(crate) fn callable(&self) -> &ForeignRef {
		&self.callable
	}

	pub fn fragment(&self) -> Fragment {
		Fragment::internal(self.func_name.clone())
	}
}

/// Per-query-compilation bind step.
///
/// Side effect: progress reporting is disabled for the whole query, because
/// total cardinality is unknown ahead of the pull loop.
#[instrument(level = "trace", skip_all, name = "table_function::bind")]
pub fn bind(ctx: &mut QueryContext, input: TableFunctionBindInput) -> crate::Result<Arc<BindData>> {
	ctx.config.enable_progress_bar = false;
	ctx.config.progress_bar_disable_reason =
		Some("table valued functions do not support progress reporting".to_string());

	let Some(info) = input.function.info.as_ref() else {
		return_error!(missing_function_info(Fragment::internal(input.function.name.clone())));
	};

	Ok(Arc::new(BindData {
		func_name: info.name().to_string(),
		args: input.args,
		named: input.named,
		return_types: info.return_types().to_vec(),
		return_names: info.return_names().to_vec(),
		mode: info.mode(),
		callable: info.callable().clone(),
	}))
}
