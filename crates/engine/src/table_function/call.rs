// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use pontoon_foreign::{ForeignRef, Session};
use pontoon_type::{
	diagnostic::table_function::{argument_conversion_failed, foreign_execution_failed, null_result},
	err, return_error,
};
use tracing::instrument;

use crate::table_function::BindData;

/// Perform the single foreign call of one invocation.
///
/// Arguments are converted to foreign form and the callable is invoked
/// under one interpreter-lock span; the guard drops only after the result
/// handle is retained. Never called twice for the same invocation.
#[instrument(level = "trace", skip_all, name = "table_function::call")]
pub(crate) fn invoke_callable(session: &Session, bind: &BindData) -> crate::Result<ForeignRef> {
	let runtime = session.runtime();
	let guard = runtime.lock().acquire();

	let mut args = Vec::with_capacity(bind.args.len());
	for (index, value) in bind.args.iter().enumerate() {
		match runtime.from_value(&guard, value, session.properties()) {
			Ok(converted) => args.push(converted),
			Err(e) => {
				return_error!(argument_conversion_failed(bind.fragment(), (index + 1).to_string(), e.to_string()))
			}
		}
	}

	let mut kwargs = Vec::with_capacity(bind.named.len());
	for (name, value) in &bind.named {
		match runtime.from_value(&guard, value, session.properties()) {
			Ok(converted) => kwargs.push((name.clone(), converted)),
			Err(e) => {
				return_error!(argument_conversion_failed(bind.fragment(), name.clone(), e.to_string()))
			}
		}
	}

	match bind.callable().call(&guard, &args, &kwargs) {
		Ok(Some(result)) => Ok(result),
		Ok(None) => err!(null_result(bind.fragment())),
		Err(e) => err!(foreign_execution_failed(bind.fragment(), e.to_string())),
	}
}
