// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

mod columns;
mod data;

pub use columns::Columns;
pub use data::{ColumnData, Container, UndefinedContainer};
use pontoon_type::Fragment;
use serde::{Deserialize, Serialize};

/// A named column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
	pub name: Fragment,
	pub data: ColumnData,
}

impl Column {
	pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
		Self {
			name: Fragment::internal(name),
			data,
		}
	}

	pub fn name(&self) -> &Fragment {
		&self.name
	}

	pub fn data(&self) -> &ColumnData {
		&self.data
	}

	pub fn data_mut(&mut self) -> &mut ColumnData {
		&mut self.data
	}
}
