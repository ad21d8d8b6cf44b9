// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

//! An in-process stand-in for an embedded interpreter.
//!
//! Objects are plain Rust values behind the [`ForeignObject`] capability
//! surface, and the runtime counts calls and releases so tests can assert
//! on lock discipline and teardown behavior.

use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use parking_lot::Mutex;
use pontoon_core::interface::ColumnarSchema;
use pontoon_core::value::column::Columns;
use pontoon_foreign::{
	ForeignError, ForeignIterator, ForeignObject, ForeignRef, ForeignRuntime, InterpreterGuard, InterpreterLock,
	SessionProperties,
};
use pontoon_type::{IntoValue, Type, Value};

// Callables receive their arguments converted back to engine values; mock
// closures have no interpreter guard of their own to touch foreign refs with.
type CallFn = Box<dyn Fn(&[Value], &[(String, Value)]) -> Result<Option<ForeignRef>, ForeignError> + Send + Sync>;

#[derive(Default)]
struct Counters {
	calls: AtomicUsize,
	releases: AtomicUsize,
	releases_under_lock: AtomicUsize,
}

/// Mock interpreter runtime: one lock, shared counters, object builders.
pub struct TestRuntime {
	lock: Arc<InterpreterLock>,
	counters: Arc<Counters>,
}

impl TestRuntime {
	pub fn new() -> Self {
		Self {
			lock: Arc::new(InterpreterLock::new()),
			counters: Arc::new(Counters::default()),
		}
	}

	/// Number of foreign callable invocations so far.
	pub fn call_count(&self) -> usize {
		self.counters.calls.load(Ordering::SeqCst)
	}

	/// Number of foreign objects released so far.
	pub fn release_count(&self) -> usize {
		self.counters.releases.load(Ordering::SeqCst)
	}

	/// Number of foreign objects released while the interpreter lock was
	/// held.
	pub fn releases_under_lock(&self) -> usize {
		self.counters.releases_under_lock.load(Ordering::SeqCst)
	}

	fn object(&self, kind: TestObjectKind) -> ForeignRef {
		Arc::new(TestObject {
			lock: self.lock.clone(),
			counters: self.counters.clone(),
			kind,
		})
	}

	pub fn scalar(&self, value: impl IntoValue) -> ForeignRef {
		self.object(TestObjectKind::Scalar(value.into_value()))
	}

	pub fn string(&self, text: &str) -> ForeignRef {
		self.scalar(text)
	}

	pub fn sequence(&self, items: Vec<ForeignRef>) -> ForeignRef {
		self.object(TestObjectKind::Sequence {
			items,
			raise_at: None,
		})
	}

	/// A sequence whose iterator raises after yielding `raise_at`
	/// elements.
	pub fn failing_sequence(&self, items: Vec<ForeignRef>, raise_at: usize, message: &str) -> ForeignRef {
		self.object(TestObjectKind::Sequence {
			items,
			raise_at: Some((raise_at, message.to_string())),
		})
	}

	/// An object that raises on any conversion or indexing attempt.
	pub fn raising(&self, message: &str) -> ForeignRef {
		self.object(TestObjectKind::Raising {
			message: message.to_string(),
		})
	}

	/// A `[name, type]` schema entry.
	pub fn pair(&self, name: &str, ty: &str) -> ForeignRef {
		self.sequence(vec![self.string(name), self.string(ty)])
	}

	/// A full schema: a sequence of `[name, type]` entries.
	pub fn schema(&self, pairs: &[(&str, &str)]) -> ForeignRef {
		self.sequence(pairs.iter().map(|(name, ty)| self.pair(name, ty)).collect())
	}

	/// A row: a sequence of scalar values, indexable by position.
	pub fn row(&self, values: Vec<Value>) -> ForeignRef {
		self.sequence(values.into_iter().map(|v| self.scalar(v)).collect())
	}

	/// A sequence of rows, as a tuples-mode callable would return.
	pub fn rows(&self, rows: Vec<Vec<Value>>) -> ForeignRef {
		self.sequence(rows.into_iter().map(|row| self.row(row)).collect())
	}

	pub fn callable(
		&self,
		f: impl Fn(&[Value], &[(String, Value)]) -> Result<Option<ForeignRef>, ForeignError> + Send + Sync + 'static,
	) -> ForeignRef {
		self.object(TestObjectKind::Callable(Box::new(f)))
	}

	/// A callable that returns the given rows.
	pub fn returning_rows(&self, rows: Vec<Vec<Value>>) -> ForeignRef {
		let result = self.rows(rows);
		self.callable(move |_, _| Ok(Some(result.clone())))
	}

	/// A callable that returns no usable result.
	pub fn returning_none(&self) -> ForeignRef {
		self.callable(|_, _| Ok(None))
	}

	/// A callable that raises.
	pub fn raising_callable(&self, message: &str) -> ForeignRef {
		let message = message.to_string();
		self.callable(move |_, _| Err(ForeignError::raised(message.clone())))
	}

	/// A columnar dataset exposing a schema and a shared chunk stream.
	pub fn stream(&self, schema: ColumnarSchema, chunks: Vec<Columns>) -> ForeignRef {
		self.object(TestObjectKind::Stream {
			schema,
			chunks: Mutex::new(chunks.into()),
		})
	}

	/// A callable that builds a fresh columnar dataset per invocation, the
	/// way a foreign function would.
	pub fn returning_stream(&self, schema: ColumnarSchema, chunks: Vec<Columns>) -> ForeignRef {
		let lock = self.lock.clone();
		let counters = self.counters.clone();
		self.callable(move |_, _| {
			Ok(Some(Arc::new(TestObject {
				lock: lock.clone(),
				counters: counters.clone(),
				kind: TestObjectKind::Stream {
					schema: schema.clone(),
					chunks: Mutex::new(chunks.clone().into()),
				},
			}) as ForeignRef))
		})
	}
}

impl Default for TestRuntime {
	fn default() -> Self {
		Self::new()
	}
}

impl ForeignRuntime for TestRuntime {
	fn lock(&self) -> &InterpreterLock {
		&self.lock
	}

	fn from_value(
		&self,
		_guard: &InterpreterGuard,
		value: &Value,
		_properties: &SessionProperties,
	) -> Result<ForeignRef, ForeignError> {
		Ok(self.scalar(value.clone()))
	}
}

enum TestObjectKind {
	Scalar(Value),
	Sequence {
		items: Vec<ForeignRef>,
		raise_at: Option<(usize, String)>,
	},
	Callable(CallFn),
	Stream {
		schema: ColumnarSchema,
		chunks: Mutex<VecDeque<Columns>>,
	},
	Raising {
		message: String,
	},
}

/// A mock foreign object.
pub struct TestObject {
	lock: Arc<InterpreterLock>,
	counters: Arc<Counters>,
	kind: TestObjectKind,
}

impl Drop for TestObject {
	fn drop(&mut self) {
		self.counters.releases.fetch_add(1, Ordering::SeqCst);
		if self.lock.is_locked() {
			self.counters.releases_under_lock.fetch_add(1, Ordering::SeqCst);
		}
	}
}

impl ForeignObject for TestObject {
	fn call(
		&self,
		guard: &InterpreterGuard,
		args: &[ForeignRef],
		kwargs: &[(String, ForeignRef)],
	) -> Result<Option<ForeignRef>, ForeignError> {
		match &self.kind {
			TestObjectKind::Callable(f) => {
				self.counters.calls.fetch_add(1, Ordering::SeqCst);
				let args = args
					.iter()
					.map(|arg| arg.to_value(guard, Type::Any))
					.collect::<Result<Vec<_>, _>>()?;
				let kwargs = kwargs
					.iter()
					.map(|(name, value)| Ok((name.clone(), value.to_value(guard, Type::Any)?)))
					.collect::<Result<Vec<_>, ForeignError>>()?;
				f(&args, &kwargs)
			}
			_ => Err(ForeignError::NotCallable),
		}
	}

	fn iterate(&self, _guard: &InterpreterGuard) -> Result<Box<dyn ForeignIterator>, ForeignError> {
		match &self.kind {
			TestObjectKind::Sequence {
				items,
				raise_at,
			} => Ok(Box::new(TestIterator {
				items: items.clone(),
				raise_at: raise_at.clone(),
				position: 0,
			})),
			_ => Err(ForeignError::NotIterable),
		}
	}

	fn get_index(&self, _guard: &InterpreterGuard, index: usize) -> Result<ForeignRef, ForeignError> {
		match &self.kind {
			TestObjectKind::Sequence {
				items,
				..
			} => items.get(index).cloned().ok_or_else(|| ForeignError::raised("index out of range")),
			TestObjectKind::Raising {
				message,
			} => Err(ForeignError::raised(message.clone())),
			_ => Err(ForeignError::NotIndexable),
		}
	}

	fn len(&self, _guard: &InterpreterGuard) -> Option<usize> {
		match &self.kind {
			TestObjectKind::Sequence {
				items,
				..
			} => Some(items.len()),
			_ => None,
		}
	}

	fn as_str(&self, _guard: &InterpreterGuard) -> Option<String> {
		match &self.kind {
			TestObjectKind::Scalar(Value::Utf8(text)) => Some(text.clone()),
			_ => None,
		}
	}

	fn to_value(&self, _guard: &InterpreterGuard, target: Type) -> Result<Value, ForeignError> {
		match &self.kind {
			TestObjectKind::Scalar(value) => coerce(value, target),
			TestObjectKind::Raising {
				message,
			} => Err(ForeignError::raised(message.clone())),
			_ => Err(ForeignError::conversion(format!("object cannot convert to {}", target))),
		}
	}

	fn stream_schema(&self, _guard: &InterpreterGuard) -> Result<ColumnarSchema, ForeignError> {
		match &self.kind {
			TestObjectKind::Stream {
				schema,
				..
			} => Ok(schema.clone()),
			TestObjectKind::Raising {
				message,
			} => Err(ForeignError::raised(message.clone())),
			_ => Err(ForeignError::NoColumnarStream),
		}
	}

	fn next_chunk(&self, _guard: &InterpreterGuard) -> Result<Option<Columns>, ForeignError> {
		match &self.kind {
			TestObjectKind::Stream {
				chunks,
				..
			} => Ok(chunks.lock().pop_front()),
			_ => Err(ForeignError::NoColumnarStream),
		}
	}
}

struct TestIterator {
	items: Vec<ForeignRef>,
	raise_at: Option<(usize, String)>,
	position: usize,
}

impl ForeignIterator for TestIterator {
	fn advance(&mut self, _guard: &InterpreterGuard) -> Result<Option<ForeignRef>, ForeignError> {
		if let Some((at, message)) = &self.raise_at {
			if self.position == *at {
				return Err(ForeignError::raised(message.clone()));
			}
		}
		if self.position >= self.items.len() {
			return Ok(None);
		}
		let item = self.items[self.position].clone();
		self.position += 1;
		Ok(Some(item))
	}
}

/// The mock conversion layer: exact matches pass through, integers widen
/// and narrow with range checks, everything else is a conversion error.
fn coerce(value: &Value, target: Type) -> Result<Value, ForeignError> {
	if target == Type::Any || Type::from(value) == target {
		return Ok(value.clone());
	}

	if value.is_undefined() {
		return Ok(Value::Undefined);
	}

	if let Some(v) = value.as_signed() {
		let converted = match target {
			Type::Int1 => i8::try_from(v).ok().map(Value::Int1),
			Type::Int2 => i16::try_from(v).ok().map(Value::Int2),
			Type::Int4 => i32::try_from(v).ok().map(Value::Int4),
			Type::Int8 => i64::try_from(v).ok().map(Value::Int8),
			Type::Int16 => Some(Value::Int16(v)),
			Type::Uint1 => u8::try_from(v).ok().map(Value::Uint1),
			Type::Uint2 => u16::try_from(v).ok().map(Value::Uint2),
			Type::Uint4 => u32::try_from(v).ok().map(Value::Uint4),
			Type::Uint8 => u64::try_from(v).ok().map(Value::Uint8),
			Type::Uint16 => u128::try_from(v).ok().map(Value::Uint16),
			Type::Float4 => Some(Value::Float4(v as f32)),
			Type::Float8 => Some(Value::Float8(v as f64)),
			_ => None,
		};
		return match converted {
			Some(value) => Ok(value),
			None => Err(ForeignError::conversion(format!("{} does not fit {}", v, target))),
		};
	}

	match (value, target) {
		(Value::Float4(v), Type::Float8) => Ok(Value::Float8(*v as f64)),
		(Value::Float8(v), Type::Float4) => Ok(Value::Float4(*v as f32)),
		_ => Err(ForeignError::conversion(format!("cannot convert {} to {}", value, target))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_coerce_widens_integers() {
		assert_eq!(coerce(&Value::Int1(5), Type::Int8).unwrap(), Value::Int8(5));
		assert_eq!(coerce(&Value::Int8(300), Type::Int2).unwrap(), Value::Int2(300));
	}

	#[test]
	fn test_coerce_range_check() {
		assert!(coerce(&Value::Int8(300), Type::Int1).is_err());
		assert!(coerce(&Value::Int4(-1), Type::Uint4).is_err());
	}

	#[test]
	fn test_coerce_rejects_mismatched_kinds() {
		assert!(coerce(&Value::Utf8("x".to_string()), Type::Int4).is_err());
	}

	#[test]
	fn test_release_counting() {
		let runtime = TestRuntime::new();
		let object = runtime.scalar(1);
		assert_eq!(runtime.release_count(), 0);
		drop(object);
		assert_eq!(runtime.release_count(), 1);
		assert_eq!(runtime.releases_under_lock(), 0);

		let object = runtime.scalar(2);
		let guard = runtime.lock.acquire();
		drop(object);
		drop(guard);
		assert_eq!(runtime.releases_under_lock(), 1);
	}
}
