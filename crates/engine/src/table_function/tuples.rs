// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use parking_lot::Mutex;
use pontoon_core::value::column::{Column, ColumnData, Columns};
use pontoon_foreign::{ForeignIterator, ForeignRuntime, Session};
use pontoon_type::{
	diagnostic::table_function::{foreign_execution_failed, invalid_row, not_iterable},
	err, return_error,
};
use tracing::instrument;

use crate::{
	execute::QueryContext,
	table_function::{BindData, call::invoke_callable},
};

/// Shared state of one tuples-mode invocation: the foreign iterator and the
/// exhaustion flag.
///
/// There is no per-worker local state on this path, so concurrent scan
/// calls serialize on the internal mutex; the engine is expected to drive a
/// tuples-mode function from one worker at a time. Exhaustion is terminal:
/// once set, every further scan returns a zero-row batch.
pub struct TuplesGlobalState {
	runtime: Arc<dyn ForeignRuntime>,
	stream: Mutex<TuplesStream>,
}

struct TuplesStream {
	iterator: Option<Box<dyn ForeignIterator>>,
	exhausted: bool,
}

impl Drop for TuplesGlobalState {
	fn drop(&mut self) {
		let mut stream = self.stream.lock();
		if let Some(iterator) = stream.iterator.take() {
			let _guard = self.runtime.lock().acquire();
			drop(iterator);
		}
	}
}

/// Invoke the callable and obtain an iterator over its result.
#[instrument(level = "trace", skip_all, name = "table_function::tuples::init_global")]
pub(crate) fn init_global(session: &Session, bind: &BindData) -> crate::Result<TuplesGlobalState> {
	let result = invoke_callable(session, bind)?;

	let runtime = session.runtime().clone();
	let iterator = {
		let guard = runtime.lock().acquire();
		let iterator = match result.iterate(&guard) {
			Ok(iterator) => iterator,
			Err(e) => return_error!(not_iterable(bind.fragment(), e.to_string())),
		};
		// The iterator keeps whatever it needs of the result alive on
		// the foreign side; the raw handle is released here, still
		// under the lock.
		drop(result);
		iterator
	};

	Ok(TuplesGlobalState {
		runtime,
		stream: Mutex::new(TuplesStream {
			iterator: Some(iterator),
			exhausted: false,
		}),
	})
}

/// Pull up to `ctx.batch_size` rows from the foreign iterator.
///
/// Rows are appended in pull order; row order is query-observable. The lock
/// is held for the whole batch fill and released before the batch is
/// handed back.
#[instrument(level = "trace", skip_all, name = "table_function::tuples::scan")]
pub(crate) fn scan(ctx: &QueryContext, bind: &BindData, gs: &TuplesGlobalState) -> crate::Result<Columns> {
	let mut data: Vec<ColumnData> =
		bind.return_types.iter().map(|ty| ColumnData::with_capacity(*ty, ctx.batch_size)).collect();

	let mut stream = gs.stream.lock();
	let state = &mut *stream;
	if !state.exhausted && state.iterator.is_some() {
		let guard = gs.runtime.lock().acquire();
		let iterator = state.iterator.as_mut().unwrap();

		for _ in 0..ctx.batch_size {
			let row = match iterator.advance(&guard) {
				Ok(Some(row)) => row,
				Ok(None) => {
					// Exhaustion mid-batch is not an error; keep
					// the rows gathered so far
					state.exhausted = true;
					break;
				}
				Err(e) => return err!(foreign_execution_failed(bind.fragment(), e.to_string())),
			};

			for (index, ty) in bind.return_types.iter().enumerate() {
				let item = match row.get_index(&guard, index) {
					Ok(item) => item,
					Err(e) => return err!(invalid_row(bind.fragment(), e.to_string())),
				};
				let value = match item.to_value(&guard, *ty) {
					Ok(value) => value,
					Err(e) => return err!(invalid_row(bind.fragment(), e.to_string())),
				};
				data[index].push_value(value);
			}
		}
	}
	drop(stream);

	// Values are engine-native now; assembling the batch needs no lock
	let columns = bind
		.return_names
		.iter()
		.zip(data)
		.map(|(name, data)| Column::new(name.clone(), data))
		.collect();
	Ok(Columns::new(columns))
}
