// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::{Diagnostic, Fragment};

/// A default session was already installed for this process
pub fn default_session_already_set() -> Diagnostic {
	Diagnostic {
		code: "SESSION_001".to_string(),
		statement: None,
		message: "default session already initialized for this process".to_string(),
		column: None,
		fragment: Fragment::None,
		label: Some("duplicate session".to_string()),
		help: Some("only one interpreter session may be active per process".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// No default session has been installed yet
pub fn default_session_not_set() -> Diagnostic {
	Diagnostic {
		code: "SESSION_002".to_string(),
		statement: None,
		message: "no default session initialized".to_string(),
		column: None,
		fragment: Fragment::None,
		label: Some("missing session".to_string()),
		help: Some("install a session with Session::set_default before using the bridge".to_string()),
		notes: vec![],
		cause: None,
	}
}
