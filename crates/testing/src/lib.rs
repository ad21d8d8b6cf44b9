// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod columnar;
pub mod runtime;

use std::sync::Arc;

pub use columnar::MemoryColumnarScan;
use pontoon_foreign::{Session, SessionProperties};
pub use runtime::{TestObject, TestRuntime};

/// A session wired to the mock runtime and the memory columnar scan.
pub fn test_session() -> (Arc<Session>, Arc<TestRuntime>, Arc<MemoryColumnarScan>) {
	let runtime = Arc::new(TestRuntime::new());
	let columnar = Arc::new(MemoryColumnarScan::new());
	let session = Arc::new(Session::new(runtime.clone(), columnar.clone(), SessionProperties::default()));
	(session, runtime, columnar)
}
