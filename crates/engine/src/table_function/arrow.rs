// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use pontoon_core::interface::{
	ChunkProducer, ColumnarBindData, ColumnarGlobalState, ColumnarLocalState, ColumnarScanInput, ColumnarSchema,
};
use pontoon_core::value::column::Columns;
use pontoon_foreign::{ForeignRef, ForeignRuntime, RetainedObject, Session};
use pontoon_type::{Fragment, diagnostic::table_function::foreign_execution_failed, err};
use tracing::instrument;

use crate::table_function::{BindData, TableFunctionInitInput, call::invoke_callable};

/// Adapter handed to the columnar-scan library as its sole data source.
///
/// Each capability call is one bounded interpreter-lock span; the library
/// itself never sees the lock. The retained result handle is released under
/// the lock when the adapter drops.
pub(crate) struct ForeignStreamFactory {
	runtime: Arc<dyn ForeignRuntime>,
	function: String,
	result: Option<ForeignRef>,
}

impl ForeignStreamFactory {
	fn new(runtime: Arc<dyn ForeignRuntime>, function: String, result: ForeignRef) -> Self {
		Self {
			runtime,
			function,
			result: Some(result),
		}
	}

	fn result(&self) -> &ForeignRef {
		// Present from construction until drop
		self.result.as_ref().unwrap()
	}

	fn fragment(&self) -> Fragment {
		Fragment::internal(self.function.clone())
	}
}

impl ChunkProducer for ForeignStreamFactory {
	fn produce_chunk(&self) -> pontoon_core::Result<Option<Columns>> {
		let guard = self.runtime.lock().acquire();
		match self.result().next_chunk(&guard) {
			Ok(chunk) => Ok(chunk),
			Err(e) => err!(foreign_execution_failed(self.fragment(), e.to_string())),
		}
	}

	fn stream_schema(&self) -> pontoon_core::Result<ColumnarSchema> {
		let guard = self.runtime.lock().acquire();
		match self.result().stream_schema(&guard) {
			Ok(schema) => Ok(schema),
			Err(e) => err!(foreign_execution_failed(self.fragment(), e.to_string())),
		}
	}
}

impl Drop for ForeignStreamFactory {
	fn drop(&mut self) {
		if let Some(result) = self.result.take() {
			let _guard = self.runtime.lock().acquire();
			drop(result);
		}
	}
}

/// Per-invocation state of one arrow-mode invocation.
///
/// Owns the raw foreign result for the invocation's lifetime (the columnar
/// library may reference its buffers without copying) plus the library's
/// own bind and global states. Scan itself contributes no per-row logic.
pub struct ArrowGlobalState {
	_retained: RetainedObject,
	// Kept alive for the invocation even if the library drops its handle
	_factory: Arc<ForeignStreamFactory>,
	bind_data: Box<dyn ColumnarBindData>,
	global: Box<dyn ColumnarGlobalState>,
	scan_input: ColumnarScanInput,
	column_count: usize,
}

impl ArrowGlobalState {
	/// Names and types as introspected by the columnar library, which is
	/// what the scan actually produces; the function's declared schema
	/// plays no role on this path.
	pub fn stream_schema(&self) -> &ColumnarSchema {
		self.bind_data.schema()
	}

	pub fn column_ids(&self) -> &[usize] {
		&self.scan_input.column_ids
	}

	pub fn column_count(&self) -> usize {
		self.column_count
	}
}

/// Per-worker state: the columnar library's own local state.
pub struct ArrowLocalState {
	local: Box<dyn ColumnarLocalState>,
}

/// Invoke the callable, retain the result and delegate binding plus
/// global-state creation to the columnar library.
#[instrument(level = "trace", skip_all, name = "table_function::arrow::init_global")]
pub(crate) fn init_global(
	session: &Session,
	bind: &BindData,
	input: &TableFunctionInitInput,
) -> crate::Result<ArrowGlobalState> {
	let result = invoke_callable(session, bind)?;
	let runtime = session.runtime().clone();

	let factory = Arc::new(ForeignStreamFactory::new(runtime.clone(), bind.func_name.clone(), result.clone()));

	// The library binds over the adapter handles only; column names and
	// types come from its own introspection of the foreign object, not
	// from the declared schema
	let bind_data = session.columnar().bind(factory.clone() as Arc<dyn ChunkProducer>)?;
	let column_count = bind_data.schema().column_count();

	// Pushed-down projection when the engine supplied one, otherwise the
	// set of all resulting column indices; filters pass through verbatim
	let column_ids = if input.column_ids.is_empty() {
		(0..column_count).collect()
	} else {
		input.column_ids.clone()
	};
	let scan_input = ColumnarScanInput {
		column_ids,
		filters: input.filters.clone(),
	};

	let global = session.columnar().init_global(bind_data.as_ref(), &scan_input)?;

	Ok(ArrowGlobalState {
		_retained: RetainedObject::new(runtime, result),
		_factory: factory,
		bind_data,
		global,
		scan_input,
		column_count,
	})
}

/// Build the columnar library's local state over the same column selection
/// and filters; one per engine worker.
#[instrument(level = "trace", skip_all, name = "table_function::arrow::init_local")]
pub(crate) fn init_local(session: &Session, gs: &ArrowGlobalState) -> crate::Result<ArrowLocalState> {
	let local = session.columnar().init_local(gs.bind_data.as_ref(), &gs.scan_input, gs.global.as_ref())?;
	Ok(ArrowLocalState {
		local,
	})
}

/// Forward to the columnar library's scan entry point verbatim; errors it
/// raises pass through unmodified.
#[instrument(level = "trace", skip_all, name = "table_function::arrow::scan")]
pub(crate) fn scan(
	session: &Session,
	gs: &ArrowGlobalState,
	ls: &mut ArrowLocalState,
) -> crate::Result<Option<Columns>> {
	session.columnar().scan(gs.bind_data.as_ref(), ls.local.as_mut(), gs.global.as_ref())
}
