// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod diagnostic;
mod error;
mod fragment;
mod params;
mod value;

pub use error::{Diagnostic, DiagnosticColumn, Error};
pub use fragment::{Fragment, StatementColumn, StatementLine};
pub use params::Params;
pub use value::{IntoValue, Type, Value};

pub type Result<T> = std::result::Result<T, Error>;
