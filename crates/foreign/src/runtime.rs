// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use pontoon_type::Value;

use crate::{ForeignError, ForeignRef, InterpreterGuard, InterpreterLock};

/// Session-level representation rules applied when values cross into the
/// interpreter (timezone for temporal rendering, float precision for
/// display-oriented conversions).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionProperties {
	pub timezone: String,
	pub float_precision: Option<u8>,
}

impl Default for SessionProperties {
	fn default() -> Self {
		Self {
			timezone: "UTC".to_string(),
			float_precision: None,
		}
	}
}

/// The embedded interpreter runtime.
///
/// Owns the interpreter lock and the engine-value-to-foreign-object half of
/// the conversion layer. The reverse direction lives on
/// [`crate::ForeignObject::to_value`], next to the object being converted.
pub trait ForeignRuntime: Send + Sync {
	fn lock(&self) -> &InterpreterLock;

	fn from_value(
		&self,
		guard: &InterpreterGuard,
		value: &Value,
		properties: &SessionProperties,
	) -> Result<ForeignRef, ForeignError>;
}
