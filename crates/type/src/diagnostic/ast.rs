// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use crate::{Diagnostic, Fragment};

/// A declared type name does not map to any engine type
pub fn unrecognized_type(fragment: Fragment) -> Diagnostic {
	let name = fragment.text().to_string();
	Diagnostic {
		code: "AST_008".to_string(),
		statement: None,
		message: format!("unrecognized type name: {}", name),
		column: None,
		fragment,
		label: Some("type not found".to_string()),
		help: Some("use a known type name such as INTEGER, BIGINT, DOUBLE, VARCHAR or BOOLEAN".to_string()),
		notes: vec![],
		cause: None,
	}
}
