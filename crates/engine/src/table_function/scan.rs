// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use indexmap::IndexMap;
use pontoon_core::interface::ScanFilters;
use pontoon_core::value::column::{Column, ColumnData, Columns};
use pontoon_foreign::Session;
use pontoon_type::{Value, diagnostic::table_function::missing_function_info, return_error};
use tracing::instrument;

use crate::{
	execute::{Batch, QueryContext},
	table_function::{BindData, TableFunction, TableFunctionBindInput, TableFunctionMode, arrow, bind, tuples},
};

/// Input to init-global/init-local: the bind data plus whatever the engine
/// pushed down for this scan.
pub struct TableFunctionInitInput {
	pub bind_data: Arc<BindData>,
	/// Projection pushed down by the engine; empty means all columns.
	pub column_ids: Vec<usize>,
	pub filters: Option<Arc<ScanFilters>>,
}

impl TableFunctionInitInput {
	pub fn new(bind_data: Arc<BindData>) -> Self {
		Self {
			bind_data,
			column_ids: Vec::new(),
			filters: None,
		}
	}
}

/// Mode-specific per-invocation state. Created once per query invocation by
/// the single foreign call; owns that call's result until teardown.
pub enum TableFunctionGlobalState {
	Tuples(tuples::TuplesGlobalState),
	Arrow(arrow::ArrowGlobalState),
}

/// Mode-specific per-worker state. The tuples path has none; the engine
/// serializes its scans.
pub enum TableFunctionLocalState {
	None,
	Arrow(arrow::ArrowLocalState),
}

/// Init-global: performs the invocation's single foreign call and builds
/// the mode-specific state.
#[instrument(level = "trace", skip_all, name = "table_function::init_global")]
pub fn init_global(session: &Session, input: &TableFunctionInitInput) -> crate::Result<TableFunctionGlobalState> {
	let bind_data = &input.bind_data;
	match bind_data.mode {
		TableFunctionMode::Tuples => Ok(TableFunctionGlobalState::Tuples(tuples::init_global(session, bind_data)?)),
		TableFunctionMode::ArrowTable => {
			Ok(TableFunctionGlobalState::Arrow(arrow::init_global(session, bind_data, input)?))
		}
	}
}

/// Init-local: per-worker state, present only on the delegate path.
#[instrument(level = "trace", skip_all, name = "table_function::init_local")]
pub fn init_local(session: &Session, global: &TableFunctionGlobalState) -> crate::Result<TableFunctionLocalState> {
	match global {
		TableFunctionGlobalState::Tuples(_) => Ok(TableFunctionLocalState::None),
		TableFunctionGlobalState::Arrow(gs) => Ok(TableFunctionLocalState::Arrow(arrow::init_local(session, gs)?)),
	}
}

/// Scan: produce the next batch, at most `ctx.batch_size` rows on the
/// tuples path. A zero-row batch signals exhaustion and is repeatable
/// without error.
#[instrument(level = "trace", skip_all, name = "table_function::scan")]
pub fn scan(
	session: &Session,
	ctx: &QueryContext,
	bind_data: &BindData,
	global: &TableFunctionGlobalState,
	local: &mut TableFunctionLocalState,
) -> crate::Result<Columns> {
	match (global, local) {
		(TableFunctionGlobalState::Tuples(gs), _) => tuples::scan(ctx, bind_data, gs),
		(TableFunctionGlobalState::Arrow(gs), TableFunctionLocalState::Arrow(ls)) => {
			match arrow::scan(session, gs, ls)? {
				Some(columns) => Ok(columns),
				// Exhausted: an empty batch over the introspected
				// schema
				None => {
					let schema = gs.stream_schema();
					let columns = gs
						.column_ids()
						.iter()
						.map(|&id| {
							Column::new(
								schema.names[id].clone(),
								ColumnData::with_capacity(schema.types[id], 0),
							)
						})
						.collect();
					Ok(Columns::new(columns))
				}
			}
		}
		(TableFunctionGlobalState::Arrow(_), TableFunctionLocalState::None) => {
			return_error!(missing_function_info(bind_data.fragment()));
		}
	}
}

/// Pull-based scan node driving the three-level protocol for one query.
///
/// `UNINITIALIZED --bind--> BOUND --init-global--> READY --next*-->
/// READY | EXHAUSTED`; exhaustion is terminal, the foreign call is never
/// retried.
pub struct TableFunctionScanNode {
	session: Arc<Session>,
	ctx: QueryContext,
	bind_data: Arc<BindData>,
	global: Option<TableFunctionGlobalState>,
	local: TableFunctionLocalState,
	exhausted: bool,
}

impl TableFunctionScanNode {
	pub fn new(
		session: Arc<Session>,
		mut ctx: QueryContext,
		function: &TableFunction,
		args: Vec<Value>,
		named: IndexMap<String, Value>,
	) -> crate::Result<Self> {
		let bind_data = bind(&mut ctx, TableFunctionBindInput {
			function,
			args,
			named,
		})?;

		Ok(Self {
			session,
			ctx,
			bind_data,
			global: None,
			local: TableFunctionLocalState::None,
			exhausted: false,
		})
	}

	pub fn bind_data(&self) -> &Arc<BindData> {
		&self.bind_data
	}

	pub fn context(&self) -> &QueryContext {
		&self.ctx
	}

	/// Produce the next batch, initializing the invocation states on the
	/// first call. Returns `None` once exhausted, forever after.
	pub fn next(&mut self) -> crate::Result<Option<Batch>> {
		if self.exhausted {
			return Ok(None);
		}

		// Initialize on first call; the single foreign call happens here
		if self.global.is_none() {
			let input = TableFunctionInitInput::new(self.bind_data.clone());
			let global = init_global(&self.session, &input)?;
			self.local = init_local(&self.session, &global)?;
			self.global = Some(global);
		}

		let global = self.global.as_ref().unwrap();
		let columns = scan(&self.session, &self.ctx, &self.bind_data, global, &mut self.local)?;

		if columns.is_empty() {
			self.exhausted = true;
			return Ok(None);
		}

		Ok(Some(Batch {
			columns,
		}))
	}
}
