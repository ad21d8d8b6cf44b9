// Copyright (c) pontoon.dev 2025
// This file is licensed under the AGPL-3.0-or-later, see license.md file

use thiserror::Error;

/// An error raised on the foreign side of the bridge.
///
/// Carried as plain text so the originating interpreter error survives into
/// the engine diagnostic that eventually reaches the user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForeignError {
	#[error("{message}")]
	Raised {
		message: String,
	},
	#[error("object is not callable")]
	NotCallable,
	#[error("object is not iterable")]
	NotIterable,
	#[error("object does not support indexing")]
	NotIndexable,
	#[error("object does not expose a columnar stream")]
	NoColumnarStream,
	#[error("cannot convert object: {message}")]
	Conversion {
		message: String,
	},
}

impl ForeignError {
	pub fn raised(message: impl Into<String>) -> Self {
		ForeignError::Raised {
			message: message.into(),
		}
	}

	pub fn conversion(message: impl Into<String>) -> Self {
		ForeignError::Conversion {
			message: message.into(),
		}
	}
}
