//! Storage-related types shared across the tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the order service does when the data file exists but cannot be
/// decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptStorePolicy {
	/// Surface the corruption to the caller and leave the file untouched.
	#[default]
	Fail,
	/// Continue with an empty collection. The next successful write
	/// replaces the unreadable file.
	TreatAsEmpty,
}

impl fmt::Display for CorruptStorePolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CorruptStorePolicy::Fail => write!(f, "fail"),
			CorruptStorePolicy::TreatAsEmpty => write!(f, "treat_as_empty"),
		}
	}
}
