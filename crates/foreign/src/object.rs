// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::sync::Arc;

use pontoon_core::interface::ColumnarSchema;
use pontoon_core::value::column::Columns;
use pontoon_type::{Type, Value};

use crate::{ForeignError, ForeignRuntime, InterpreterGuard};

/// Shared handle to a foreign object.
pub type ForeignRef = Arc<dyn ForeignObject>;

/// Capability surface of a foreign object.
///
/// Every method takes an [`InterpreterGuard`], proving the caller holds the
/// interpreter lock for the duration of the touch. Objects implement only
/// the capabilities they actually have; the defaults report the capability
/// as absent so the bridge can surface a precise error.
pub trait ForeignObject: Send + Sync {
	/// Invoke the object with positional and named arguments. `Ok(None)`
	/// means the call succeeded but produced no usable result.
	fn call(
		&self,
		_guard: &InterpreterGuard,
		_args: &[ForeignRef],
		_kwargs: &[(String, ForeignRef)],
	) -> Result<Option<ForeignRef>, ForeignError> {
		Err(ForeignError::NotCallable)
	}

	/// Obtain a one-shot iterator over the object.
	fn iterate(&self, _guard: &InterpreterGuard) -> Result<Box<dyn ForeignIterator>, ForeignError> {
		Err(ForeignError::NotIterable)
	}

	/// Index into the object by position.
	fn get_index(&self, _guard: &InterpreterGuard, _index: usize) -> Result<ForeignRef, ForeignError> {
		Err(ForeignError::NotIndexable)
	}

	/// Sequence length, when the object is a sequence.
	fn len(&self, _guard: &InterpreterGuard) -> Option<usize> {
		None
	}

	/// The object's text, when the object is a plain string.
	fn as_str(&self, _guard: &InterpreterGuard) -> Option<String> {
		None
	}

	/// Convert the object into an engine value of the target type.
	fn to_value(&self, _guard: &InterpreterGuard, target: Type) -> Result<Value, ForeignError> {
		Err(ForeignError::conversion(format!("conversion to {} not supported", target)))
	}

	/// Schema of the columnar dataset this object exposes, if any.
	fn stream_schema(&self, _guard: &InterpreterGuard) -> Result<ColumnarSchema, ForeignError> {
		Err(ForeignError::NoColumnarStream)
	}

	/// Produce the next chunk of the columnar dataset this object
	/// exposes. `Ok(None)` signals exhaustion.
	fn next_chunk(&self, _guard: &InterpreterGuard) -> Result<Option<Columns>, ForeignError> {
		Err(ForeignError::NoColumnarStream)
	}
}

/// One-shot, non-restartable iteration over a foreign object.
///
/// `Ok(Some(_))` yields the next element, `Ok(None)` reports exhaustion and
/// `Err(_)` is a fatal foreign error; exhaustion is a state, not an error.
pub trait ForeignIterator: Send {
	fn advance(&mut self, guard: &InterpreterGuard) -> Result<Option<ForeignRef>, ForeignError>;
}

/// A foreign reference retained for the lifetime of some engine state and
/// released under the interpreter lock, exactly once, when that state is
/// dropped.
pub struct RetainedObject {
	runtime: Arc<dyn ForeignRuntime>,
	object: Option<ForeignRef>,
}

impl RetainedObject {
	pub fn new(runtime: Arc<dyn ForeignRuntime>, object: ForeignRef) -> Self {
		Self {
			runtime,
			object: Some(object),
		}
	}

	pub fn get(&self) -> &ForeignRef {
		// Present from construction until drop
		self.object.as_ref().unwrap()
	}
}

impl Drop for RetainedObject {
	fn drop(&mut self) {
		if let Some(object) = self.object.take() {
			let _guard = self.runtime.lock().acquire();
			drop(object);
		}
	}
}
