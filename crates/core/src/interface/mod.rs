// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

pub mod columnar;

pub use columnar::{
	ChunkProducer, ColumnarBindData, ColumnarGlobalState, ColumnarLocalState, ColumnarScan, ColumnarScanInput,
	ColumnarSchema, FilterPredicate, ScanFilters,
};
