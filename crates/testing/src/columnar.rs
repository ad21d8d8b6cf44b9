// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! A memory-backed columnar-scan library.
//!
//! Small but honest: it introspects the stream schema through the producer
//! handle at bind time, applies the pushed-down projection and filters
//! itself, and carries its own bind/global/local states as the real
//! library would.

use std::{any::Any, cmp::Ordering, sync::Arc};

use parking_lot::Mutex;
use pontoon_core::interface::{
	ChunkProducer, ColumnarBindData, ColumnarGlobalState, ColumnarLocalState, ColumnarScan, ColumnarScanInput,
	ColumnarSchema, FilterPredicate, ScanFilters,
};
use pontoon_core::value::column::{Column, ColumnData, Columns};
use pontoon_type::{Diagnostic, Error, Fragment, Value};

fn state_mismatch() -> Error {
	Error(Diagnostic {
		code: "COLUMNAR_001".to_string(),
		statement: None,
		message: "columnar scan invoked with foreign state objects".to_string(),
		column: None,
		fragment: Fragment::None,
		label: Some("state mismatch".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	})
}

/// The library itself. Records the most recent column selection so tests
/// can assert on what the engine pushed down.
pub struct MemoryColumnarScan {
	last_selection: Mutex<Option<Vec<usize>>>,
}

impl MemoryColumnarScan {
	pub fn new() -> Self {
		Self {
			last_selection: Mutex::new(None),
		}
	}

	pub fn last_selection(&self) -> Option<Vec<usize>> {
		self.last_selection.lock().clone()
	}
}

impl Default for MemoryColumnarScan {
	fn default() -> Self {
		Self::new()
	}
}

struct MemoryBindData {
	schema: ColumnarSchema,
	producer: Arc<dyn ChunkProducer>,
}

impl ColumnarBindData for MemoryBindData {
	fn schema(&self) -> &ColumnarSchema {
		&self.schema
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

struct MemoryGlobalState {
	column_ids: Vec<usize>,
	filters: Option<Arc<ScanFilters>>,
}

impl ColumnarGlobalState for MemoryGlobalState {
	fn as_any(&self) -> &dyn Any {
		self
	}
}

struct MemoryLocalState;

impl ColumnarLocalState for MemoryLocalState {
	fn as_any_mut(&mut self) -> &mut dyn Any {
		self
	}
}

impl ColumnarScan for MemoryColumnarScan {
	fn bind(&self, producer: Arc<dyn ChunkProducer>) -> pontoon_core::Result<Box<dyn ColumnarBindData>> {
		let schema = producer.stream_schema()?;
		Ok(Box::new(MemoryBindData {
			schema,
			producer,
		}))
	}

	fn init_global(
		&self,
		_bind: &dyn ColumnarBindData,
		input: &ColumnarScanInput,
	) -> pontoon_core::Result<Box<dyn ColumnarGlobalState>> {
		*self.last_selection.lock() = Some(input.column_ids.clone());
		Ok(Box::new(MemoryGlobalState {
			column_ids: input.column_ids.clone(),
			filters: input.filters.clone(),
		}))
	}

	fn init_local(
		&self,
		_bind: &dyn ColumnarBindData,
		_input: &ColumnarScanInput,
		global: &dyn ColumnarGlobalState,
	) -> pontoon_core::Result<Box<dyn ColumnarLocalState>> {
		if global.as_any().downcast_ref::<MemoryGlobalState>().is_none() {
			return Err(state_mismatch());
		}
		Ok(Box::new(MemoryLocalState))
	}

	fn scan(
		&self,
		bind: &dyn ColumnarBindData,
		local: &mut dyn ColumnarLocalState,
		global: &dyn ColumnarGlobalState,
	) -> pontoon_core::Result<Option<Columns>> {
		let Some(bind) = bind.as_any().downcast_ref::<MemoryBindData>() else {
			return Err(state_mismatch());
		};
		let Some(global) = global.as_any().downcast_ref::<MemoryGlobalState>() else {
			return Err(state_mismatch());
		};
		if local.as_any_mut().downcast_mut::<MemoryLocalState>().is_none() {
			return Err(state_mismatch());
		}

		// A chunk that filters down to zero rows is not exhaustion;
		// keep pulling
		loop {
			let Some(chunk) = bind.producer.produce_chunk()? else {
				return Ok(None);
			};

			let kept: Vec<usize> = (0..chunk.row_count())
				.filter(|&row| matches_filters(&chunk, row, global.filters.as_deref()))
				.collect();
			if kept.is_empty() && chunk.row_count() > 0 {
				continue;
			}

			let columns = global
				.column_ids
				.iter()
				.map(|&id| {
					let source = &chunk[id];
					let mut data =
						ColumnData::with_capacity(source.data().get_type(), kept.len());
					for &row in &kept {
						data.push_value(source.data().get_value(row));
					}
					Column {
						name: source.name.clone(),
						data,
					}
				})
				.collect();
			return Ok(Some(Columns::new(columns)));
		}
	}
}

fn matches_filters(chunk: &Columns, row: usize, filters: Option<&ScanFilters>) -> bool {
	let Some(filters) = filters else {
		return true;
	};
	filters.predicates.iter().all(|predicate| match predicate {
		FilterPredicate::IsDefined {
			column,
		} => !chunk[*column].data().get_value(row).is_undefined(),
		FilterPredicate::Equals {
			column,
			value,
		} => compare(&chunk[*column].data().get_value(row), value) == Some(Ordering::Equal),
		FilterPredicate::GreaterThan {
			column,
			value,
		} => compare(&chunk[*column].data().get_value(row), value) == Some(Ordering::Greater),
		FilterPredicate::LessThan {
			column,
			value,
		} => compare(&chunk[*column].data().get_value(row), value) == Some(Ordering::Less),
	})
}

fn compare(left: &Value, right: &Value) -> Option<Ordering> {
	match (left, right) {
		(Value::Utf8(l), Value::Utf8(r)) => Some(l.cmp(r)),
		(Value::Boolean(l), Value::Boolean(r)) => Some(l.cmp(r)),
		(Value::Float4(l), Value::Float4(r)) => l.partial_cmp(r),
		(Value::Float8(l), Value::Float8(r)) => l.partial_cmp(r),
		_ => match (left.as_signed(), right.as_signed()) {
			(Some(l), Some(r)) => Some(l.cmp(&r)),
			_ => None,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct VecProducer {
		schema: ColumnarSchema,
		chunks: Mutex<Vec<Columns>>,
	}

	impl ChunkProducer for VecProducer {
		fn produce_chunk(&self) -> pontoon_core::Result<Option<Columns>> {
			let mut chunks = self.chunks.lock();
			if chunks.is_empty() {
				Ok(None)
			} else {
				Ok(Some(chunks.remove(0)))
			}
		}

		fn stream_schema(&self) -> pontoon_core::Result<ColumnarSchema> {
			Ok(self.schema.clone())
		}
	}

	fn producer() -> Arc<dyn ChunkProducer> {
		use pontoon_type::Type;

		let chunk = Columns::new(vec![
			Column::new("id", ColumnData::int4([1, 2, 3])),
			Column::new("name", ColumnData::utf8(["a", "b", "c"])),
		]);
		Arc::new(VecProducer {
			schema: ColumnarSchema::new(
				vec!["id".to_string(), "name".to_string()],
				vec![Type::Int4, Type::Utf8],
			),
			chunks: Mutex::new(vec![chunk]),
		})
	}

	#[test]
	fn test_bind_introspects_schema() {
		let scan = MemoryColumnarScan::new();
		let bind = scan.bind(producer()).unwrap();
		assert_eq!(bind.schema().column_count(), 2);
		assert_eq!(bind.schema().names, vec!["id".to_string(), "name".to_string()]);
	}

	#[test]
	fn test_scan_projects_selection() {
		let scan = MemoryColumnarScan::new();
		let bind = scan.bind(producer()).unwrap();
		let input = ColumnarScanInput {
			column_ids: vec![1],
			filters: None,
		};
		let global = scan.init_global(bind.as_ref(), &input).unwrap();
		let mut local = scan.init_local(bind.as_ref(), &input, global.as_ref()).unwrap();

		let chunk = scan.scan(bind.as_ref(), local.as_mut(), global.as_ref()).unwrap().unwrap();
		assert_eq!(chunk.shape(), (3, 1));
		assert_eq!(chunk[0].name().text(), "name");

		assert!(scan.scan(bind.as_ref(), local.as_mut(), global.as_ref()).unwrap().is_none());
		assert_eq!(scan.last_selection(), Some(vec![1]));
	}

	#[test]
	fn test_equals_and_defined_predicates() {
		use pontoon_type::Type;

		let chunk = Columns::new(vec![Column::new("id", {
			let mut data = ColumnData::with_capacity(Type::Int4, 3);
			data.push_value(Value::Int4(1));
			data.push_value(Value::Undefined);
			data.push_value(Value::Int4(1));
			data
		})]);
		let producer = Arc::new(VecProducer {
			schema: ColumnarSchema::new(vec!["id".to_string()], vec![Type::Int4]),
			chunks: Mutex::new(vec![chunk]),
		});

		let scan = MemoryColumnarScan::new();
		let bind = scan.bind(producer).unwrap();
		let input = ColumnarScanInput {
			column_ids: vec![0],
			filters: Some(Arc::new(ScanFilters::new(vec![
				FilterPredicate::IsDefined {
					column: 0,
				},
				FilterPredicate::Equals {
					column: 0,
					value: Value::Int4(1),
				},
			]))),
		};
		let global = scan.init_global(bind.as_ref(), &input).unwrap();
		let mut local = scan.init_local(bind.as_ref(), &input, global.as_ref()).unwrap();

		let chunk = scan.scan(bind.as_ref(), local.as_mut(), global.as_ref()).unwrap().unwrap();
		assert_eq!(chunk.shape(), (2, 1));
	}

	#[test]
	fn test_scan_applies_filters() {
		let scan = MemoryColumnarScan::new();
		let bind = scan.bind(producer()).unwrap();
		let input = ColumnarScanInput {
			column_ids: vec![0, 1],
			filters: Some(Arc::new(ScanFilters::new(vec![FilterPredicate::GreaterThan {
				column: 0,
				value: Value::Int4(1),
			}]))),
		};
		let global = scan.init_global(bind.as_ref(), &input).unwrap();
		let mut local = scan.init_local(bind.as_ref(), &input, global.as_ref()).unwrap();

		let chunk = scan.scan(bind.as_ref(), local.as_mut(), global.as_ref()).unwrap().unwrap();
		assert_eq!(chunk.shape(), (2, 2));
		assert_eq!(chunk[0].data().get_value(0), Value::Int4(2));
	}
}
