// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use std::ops::{Deref, Index};

use pontoon_type::Value;
use serde::{Deserialize, Serialize};

use crate::value::column::{Column, ColumnData, UndefinedContainer};

/// A batch of equally-long columns; the unit every scan produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Columns {
	columns: Vec<Column>,
}

impl Deref for Columns {
	type Target = [Column];

	fn deref(&self) -> &Self::Target {
		&self.columns
	}
}

impl Index<usize> for Columns {
	type Output = Column;

	fn index(&self, index: usize) -> &Self::Output {
		self.columns.index(index)
	}
}

impl Columns {
	pub fn new(columns: Vec<Column>) -> Self {
		let n = columns.first().map_or(0, |c| c.data().len());
		assert!(columns.iter().all(|c| c.data().len() == n));

		Self {
			columns,
		}
	}

	pub fn empty() -> Self {
		Self {
			columns: Vec::new(),
		}
	}

	pub fn from_rows(names: &[&str], rows: &[Vec<Value>]) -> Self {
		let column_count = names.len();

		// Column types are derived from the first row; an empty row set
		// produces untyped zero-length columns.
		let mut columns: Vec<Column> = names
			.iter()
			.enumerate()
			.map(|(i, name)| {
				let data = match rows.first() {
					Some(first) => ColumnData::with_capacity(first[i].get_type(), rows.len()),
					None => ColumnData::Undefined(UndefinedContainer::new(0)),
				};
				Column {
					name: pontoon_type::Fragment::internal(name.to_string()),
					data,
				}
			})
			.collect();

		for row in rows {
			assert_eq!(row.len(), column_count, "row length does not match column count");
			for (i, value) in row.iter().enumerate() {
				columns[i].data_mut().push_value(value.clone());
			}
		}

		Columns::new(columns)
	}

	pub fn shape(&self) -> (usize, usize) {
		(self.row_count(), self.columns.len())
	}

	pub fn row_count(&self) -> usize {
		self.columns.first().map_or(0, |col| col.data().len())
	}

	pub fn is_empty(&self) -> bool {
		self.row_count() == 0
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.columns.iter().find(|col| col.name().text() == name)
	}

	pub fn get_row(&self, index: usize) -> Vec<Value> {
		self.columns.iter().map(|col| col.data().get_value(index)).collect()
	}

	pub fn into_columns(self) -> Vec<Column> {
		self.columns
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_rows() {
		let columns = Columns::from_rows(
			&["name", "id"],
			&[
				vec![Value::Utf8("a".to_string()), Value::Int4(1)],
				vec![Value::Utf8("b".to_string()), Value::Int4(2)],
			],
		);

		assert_eq!(columns.shape(), (2, 2));
		assert_eq!(columns.column("name").unwrap().data().get_value(1), Value::Utf8("b".to_string()));
		assert_eq!(columns.get_row(0), vec![Value::Utf8("a".to_string()), Value::Int4(1)]);
	}

	#[test]
	fn test_empty() {
		let columns = Columns::empty();
		assert_eq!(columns.shape(), (0, 0));
		assert!(columns.is_empty());
	}

	#[test]
	fn test_zero_row_batch_keeps_columns() {
		let columns = Columns::new(vec![
			Column::new("a", ColumnData::int4([])),
			Column::new("b", ColumnData::utf8(Vec::<String>::new())),
		]);
		assert_eq!(columns.shape(), (0, 2));
		assert!(columns.is_empty());
	}
}
