// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use once_cell::sync::OnceCell;
use pontoon_core::interface::ColumnarScan;
use pontoon_type::{diagnostic::session::{default_session_already_set, default_session_not_set}, return_error};

use crate::{ForeignRuntime, SessionProperties};

static DEFAULT_SESSION: OnceCell<Arc<Session>> = OnceCell::new();

/// An explicit, owned context carrying the interpreter runtime, the
/// columnar-scan library and the session representation rules.
///
/// Passed through the whole call chain instead of being reached for
/// implicitly. A process hosts at most one default session; construction
/// itself is unrestricted so embedders and tests can wire their own.
pub struct Session {
	runtime: Arc<dyn ForeignRuntime>,
	columnar: Arc<dyn ColumnarScan>,
	properties: SessionProperties,
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("properties", &self.properties)
			.finish_non_exhaustive()
	}
}

impl Session {
	pub fn new(
		runtime: Arc<dyn ForeignRuntime>,
		columnar: Arc<dyn ColumnarScan>,
		properties: SessionProperties,
	) -> Self {
		Self {
			runtime,
			columnar,
			properties,
		}
	}

	pub fn runtime(&self) -> &Arc<dyn ForeignRuntime> {
		&self.runtime
	}

	pub fn columnar(&self) -> &Arc<dyn ColumnarScan> {
		&self.columnar
	}

	pub fn properties(&self) -> &SessionProperties {
		&self.properties
	}

	/// Install the process-wide default session. Succeeds at most once.
	pub fn set_default(session: Arc<Session>) -> crate::Result<()> {
		if DEFAULT_SESSION.set(session).is_err() {
			return_error!(default_session_already_set());
		}
		Ok(())
	}

	pub fn try_default() -> Option<Arc<Session>> {
		DEFAULT_SESSION.get().cloned()
	}

	pub fn default_session() -> crate::Result<Arc<Session>> {
		match DEFAULT_SESSION.get() {
			Some(session) => Ok(session.clone()),
			None => return_error!(default_session_not_set()),
		}
	}
}
