// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod error;
mod lock;
mod object;
mod runtime;
mod session;

pub use error::ForeignError;
pub use lock::{InterpreterGuard, InterpreterLock};
pub use object::{ForeignIterator, ForeignObject, ForeignRef, RetainedObject};
pub use runtime::{ForeignRuntime, SessionProperties};
pub use session::Session;

pub use pontoon_type::{Error, Result};
