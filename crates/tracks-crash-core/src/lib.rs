// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Tracks crash logging SDK.
//!
//! This crate holds the transport-independent vocabulary shared by the SDK
//! (`tracks-crash`) and host applications:
//! - [`CrashLoggingDataProvider`]: the capability set a host application
//!   implements to feed identity, context and policy into every report
//! - [`EventLevel`], [`CrashLoggingUser`], [`ReleaseName`] and
//!   [`PerformanceMonitoringConfig`]
//! - performance transaction identifiers, operations and statuses
//! - [`JsException`] for reports forwarded from an embedded JavaScript runtime

pub mod error;
pub mod js;
pub mod level;
pub mod performance;
pub mod provider;
pub mod user;

pub use error::{CrashCoreError, Result};
pub use js::{JsException, JsExceptionStackTraceElement};
pub use level::EventLevel;
pub use performance::{
	NoopPerformanceSampler, PerformanceSampler, TransactionOperation, TransactionStatus,
};
pub use provider::{
	ContextSnapshot, ContextUpdate, CrashLoggingDataProvider, ExtraKnownKey,
	PerformanceMonitoringConfig, ReleaseName,
};
pub use user::CrashLoggingUser;

use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of an in-flight performance transaction.
///
/// Minted by the transaction registry on every start call; valid for exactly
/// one finish call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TransactionId(pub Uuid);

impl TransactionId {
	pub fn new() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Default for TransactionId {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Display for TransactionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for TransactionId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn transaction_ids_are_unique() {
		let a = TransactionId::new();
		let b = TransactionId::new();
		assert_ne!(a, b);
	}

	proptest! {
		#[test]
		fn transaction_id_roundtrip(uuid_bytes in any::<[u8; 16]>()) {
			let id = TransactionId(Uuid::from_bytes(uuid_bytes));
			let parsed: TransactionId = id.to_string().parse().unwrap();
			prop_assert_eq!(id, parsed);
		}
	}
}
