// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use pontoon_core::value::column::Columns;
use pontoon_type::Params;

/// Rows produced by one scan call never exceed this unless a context
/// overrides the batch size.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Per-query configuration shared between the planner and the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
	pub enable_progress_bar: bool,
	pub progress_bar_disable_reason: Option<String>,
}

impl Default for QueryConfig {
	fn default() -> Self {
		Self {
			enable_progress_bar: true,
			progress_bar_disable_reason: None,
		}
	}
}

/// Execution context for one query invocation.
#[derive(Debug)]
pub struct QueryContext {
	pub batch_size: usize,
	pub params: Params,
	pub config: QueryConfig,
}

impl QueryContext {
	pub fn new() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
			params: Params::None,
			config: QueryConfig::default(),
		}
	}

	pub fn with_batch_size(batch_size: usize) -> Self {
		Self {
			batch_size,
			..Self::new()
		}
	}
}

impl Default for QueryContext {
	fn default() -> Self {
		Self::new()
	}
}

/// One unit of output from a scan.
#[derive(Debug)]
pub struct Batch {
	pub columns: Columns,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_context_defaults() {
		let ctx = QueryContext::new();
		assert_eq!(ctx.batch_size, DEFAULT_BATCH_SIZE);
		assert!(ctx.config.enable_progress_bar);
		assert_eq!(ctx.config.progress_bar_disable_reason, None);
	}

	#[test]
	fn test_with_batch_size() {
		let ctx = QueryContext::with_batch_size(16);
		assert_eq!(ctx.batch_size, 16);
	}
}
