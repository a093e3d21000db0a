// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity of the user attached to reports.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User identity supplied by the host application.
///
/// The SDK only borrows this for the duration of one enrichment pass or one
/// scope update; it is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrashLoggingUser {
	pub user_id: String,
	pub email: String,
	pub username: String,
	/// Free-form user context, forwarded alongside the identity.
	#[serde(default)]
	pub context: HashMap<String, String>,
}

impl CrashLoggingUser {
	pub fn new(
		user_id: impl Into<String>,
		email: impl Into<String>,
		username: impl Into<String>,
	) -> Self {
		Self {
			user_id: user_id.into(),
			email: email.into(),
			username: username.into(),
			context: HashMap::new(),
		}
	}

	pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.context.insert(key.into(), value.into());
		self
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn with_context_accumulates_entries() {
		let user = CrashLoggingUser::new("42", "a@b.com", "alice")
			.with_context("plan", "business")
			.with_context("site", "example.blog");

		assert_eq!(user.context.len(), 2);
		assert_eq!(user.context["plan"], "business");
	}

	#[test]
	fn context_defaults_to_empty_when_deserializing() {
		let user: CrashLoggingUser =
			serde_json::from_str(r#"{"user_id":"1","email":"e","username":"u"}"#).unwrap();
		assert!(user.context.is_empty());
	}
}
