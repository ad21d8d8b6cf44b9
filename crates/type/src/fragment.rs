// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::{
	fmt::{Display, Formatter},
	ops::Deref,
};

use serde::{Deserialize, Serialize};

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementLine(pub u32);

impl Deref for StatementLine {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatementColumn(pub u32);

impl Deref for StatementColumn {
	type Target = u32;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

/// A piece of source text a diagnostic can point at.
///
/// `Statement` fragments carry a position inside the originating query
/// statement; `Internal` fragments name something the engine produced itself
/// (a function name, a column name) with no statement position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
	#[default]
	None,
	Internal {
		text: String,
	},
	Statement {
		text: String,
		line: StatementLine,
		column: StatementColumn,
	},
}

impl Fragment {
	pub fn internal(text: impl Into<String>) -> Self {
		Fragment::Internal {
			text: text.into(),
		}
	}

	pub fn statement(text: impl Into<String>, line: u32, column: u32) -> Self {
		Fragment::Statement {
			text: text.into(),
			line: StatementLine(line),
			column: StatementColumn(column),
		}
	}

	/// Get the text value of the fragment
	pub fn text(&self) -> &str {
		match self {
			Fragment::None => "",
			Fragment::Internal {
				text,
			} => text,
			Fragment::Statement {
				text,
				..
			} => text,
		}
	}

	pub fn line(&self) -> StatementLine {
		match self {
			Fragment::Statement {
				line,
				..
			} => *line,
			_ => StatementLine(1),
		}
	}

	pub fn column(&self) -> StatementColumn {
		match self {
			Fragment::Statement {
				column,
				..
			} => *column,
			_ => StatementColumn(0),
		}
	}
}

impl Display for Fragment {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.text())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_internal_text() {
		let fragment = Fragment::internal("gen_series");
		assert_eq!(fragment.text(), "gen_series");
		assert_eq!(*fragment.line(), 1);
		assert_eq!(*fragment.column(), 0);
	}

	#[test]
	fn test_statement_position() {
		let fragment = Fragment::statement("from gen()", 3, 7);
		assert_eq!(fragment.text(), "from gen()");
		assert_eq!(*fragment.line(), 3);
		assert_eq!(*fragment.column(), 7);
	}

	#[test]
	fn test_none_is_empty() {
		assert_eq!(Fragment::None.text(), "");
	}
}
