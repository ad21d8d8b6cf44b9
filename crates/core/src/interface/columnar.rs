// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! Contract for an external columnar-scan library.
//!
//! The engine consumes the library exclusively through this seam: it hands
//! over a [`ChunkProducer`] as the library's sole data source and threads the
//! opaque bind/global/local state objects back into every call. The library
//! owns schema introspection, projection and filter evaluation; the engine
//! performs no per-row work on this path.

use std::{any::Any, sync::Arc};

use pontoon_type::{Type, Value};
use serde::{Deserialize, Serialize};

use crate::value::column::Columns;

/// Schema of a columnar stream as introspected by the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnarSchema {
	pub names: Vec<String>,
	pub types: Vec<Type>,
}

impl ColumnarSchema {
	pub fn new(names: Vec<String>, types: Vec<Type>) -> Self {
		debug_assert_eq!(names.len(), types.len());
		Self {
			names,
			types,
		}
	}

	pub fn column_count(&self) -> usize {
		self.types.len()
	}
}

/// Capability handle the engine passes to the library as its only data
/// source: produce the next chunk, or introspect the stream schema.
pub trait ChunkProducer: Send + Sync {
	fn produce_chunk(&self) -> crate::Result<Option<Columns>>;

	fn stream_schema(&self) -> crate::Result<ColumnarSchema>;
}

/// A single predicate pushed down into the scan, addressed by source
/// column index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterPredicate {
	IsDefined {
		column: usize,
	},
	Equals {
		column: usize,
		value: Value,
	},
	GreaterThan {
		column: usize,
		value: Value,
	},
	LessThan {
		column: usize,
		value: Value,
	},
}

/// Predicates the engine pushed down; forwarded to the library verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanFilters {
	pub predicates: Vec<FilterPredicate>,
}

impl ScanFilters {
	pub fn new(predicates: Vec<FilterPredicate>) -> Self {
		Self {
			predicates,
		}
	}
}

/// Column selection and filters for one global/local state request.
#[derive(Debug, Clone)]
pub struct ColumnarScanInput {
	pub column_ids: Vec<usize>,
	pub filters: Option<Arc<ScanFilters>>,
}

/// Library-owned bind state; opaque apart from the introspected schema.
pub trait ColumnarBindData: Send + Sync {
	fn schema(&self) -> &ColumnarSchema;

	fn as_any(&self) -> &dyn Any;
}

/// Library-owned per-invocation state; opaque to the engine.
pub trait ColumnarGlobalState: Send + Sync {
	fn as_any(&self) -> &dyn Any;
}

/// Library-owned per-worker state; opaque to the engine.
pub trait ColumnarLocalState: Send {
	fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// The columnar-scan library's own three-level protocol.
pub trait ColumnarScan: Send + Sync {
	/// Bind over the producer handle; the returned schema comes from the
	/// library's own introspection of the stream.
	fn bind(&self, producer: Arc<dyn ChunkProducer>) -> crate::Result<Box<dyn ColumnarBindData>>;

	fn init_global(
		&self,
		bind: &dyn ColumnarBindData,
		input: &ColumnarScanInput,
	) -> crate::Result<Box<dyn ColumnarGlobalState>>;

	fn init_local(
		&self,
		bind: &dyn ColumnarBindData,
		input: &ColumnarScanInput,
		global: &dyn ColumnarGlobalState,
	) -> crate::Result<Box<dyn ColumnarLocalState>>;

	/// Produce the next batch for one worker; `None` signals exhaustion.
	fn scan(
		&self,
		bind: &dyn ColumnarBindData,
		local: &mut dyn ColumnarLocalState,
		global: &dyn ColumnarGlobalState,
	) -> crate::Result<Option<Columns>>;
}
