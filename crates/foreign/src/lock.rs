// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use parking_lot::{Mutex, MutexGuard};

/// The interpreter-wide exclusion lock.
///
/// Every touch of a foreign object requires a live [`InterpreterGuard`];
/// capability methods take the guard by reference, so a foreign access
/// without the lock does not compile. Guards must be held only for the span
/// that actually touches foreign memory and must not be acquired while one
/// is already held on the same thread.
pub struct InterpreterLock {
	inner: Mutex<()>,
}

impl InterpreterLock {
	pub fn new() -> Self {
		Self {
			inner: Mutex::new(()),
		}
	}

	/// Block until the lock is available, then hold it for the guard's
	/// lifetime. Release is guaranteed on every exit path, including
	/// unwinding.
	pub fn acquire(&self) -> InterpreterGuard<'_> {
		InterpreterGuard {
			_guard: self.inner.lock(),
		}
	}

	pub fn is_locked(&self) -> bool {
		self.inner.is_locked()
	}
}

impl Default for InterpreterLock {
	fn default() -> Self {
		Self::new()
	}
}

/// Proof of exclusive access to the interpreter.
pub struct InterpreterGuard<'a> {
	_guard: MutexGuard<'a, ()>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_guard_scopes_the_lock() {
		let lock = InterpreterLock::new();
		assert!(!lock.is_locked());
		{
			let _guard = lock.acquire();
			assert!(lock.is_locked());
		}
		assert!(!lock.is_locked());
	}

	#[test]
	fn test_reacquire_after_release() {
		let lock = InterpreterLock::new();
		drop(lock.acquire());
		drop(lock.acquire());
		assert!(!lock.is_locked());
	}
}
