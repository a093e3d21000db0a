// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Performance transaction vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CrashCoreError;
use crate::provider::PerformanceMonitoringConfig;

/// Terminal status of a finished transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
	Successful,
	Aborted,
}

impl fmt::Display for TransactionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Successful => write!(f, "successful"),
			Self::Aborted => write!(f, "aborted"),
		}
	}
}

impl FromStr for TransactionStatus {
	type Err = CrashCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"successful" => Ok(Self::Successful),
			"aborted" => Ok(Self::Aborted),
			_ => Err(CrashCoreError::InvalidTransactionStatus(s.to_string())),
		}
	}
}

/// Kind of work a transaction measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionOperation {
	#[serde(rename = "ui.load")]
	UiLoad,
	#[serde(rename = "ui.action")]
	UiAction,
	#[serde(rename = "http.client")]
	HttpClient,
	#[serde(rename = "db.query")]
	DbQuery,
}

impl TransactionOperation {
	/// Operation name as understood by the tracking backend.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::UiLoad => "ui.load",
			Self::UiAction => "ui.action",
			Self::HttpClient => "http.client",
			Self::DbQuery => "db.query",
		}
	}
}

impl fmt::Display for TransactionOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TransactionOperation {
	type Err = CrashCoreError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"ui.load" => Ok(Self::UiLoad),
			"ui.action" => Ok(Self::UiAction),
			"http.client" => Ok(Self::HttpClient),
			"db.query" => Ok(Self::DbQuery),
			_ => Err(CrashCoreError::InvalidTransactionOperation(s.to_string())),
		}
	}
}

/// Decides, per transaction name, whether and how often it is traced.
pub trait PerformanceSampler: Send + Sync {
	fn sample(&self, transaction_name: &str) -> PerformanceMonitoringConfig;
}

/// Sampler that never traces anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPerformanceSampler;

impl PerformanceSampler for NoopPerformanceSampler {
	fn sample(&self, _transaction_name: &str) -> PerformanceMonitoringConfig {
		PerformanceMonitoringConfig::Disabled
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn noop_sampler_disables_tracing() {
		assert_eq!(
			NoopPerformanceSampler.sample("checkout"),
			PerformanceMonitoringConfig::Disabled
		);
	}

	#[test]
	fn operation_serializes_with_backend_name() {
		let json = serde_json::to_string(&TransactionOperation::UiLoad).unwrap();
		assert_eq!(json, "\"ui.load\"");
	}

	proptest! {
		#[test]
		fn transaction_status_roundtrip(status in prop_oneof![
			Just(TransactionStatus::Successful),
			Just(TransactionStatus::Aborted),
		]) {
			let parsed: TransactionStatus = status.to_string().parse().unwrap();
			prop_assert_eq!(status, parsed);
		}

		#[test]
		fn transaction_operation_roundtrip(op in prop_oneof![
			Just(TransactionOperation::UiLoad),
			Just(TransactionOperation::UiAction),
			Just(TransactionOperation::HttpClient),
			Just(TransactionOperation::DbQuery),
		]) {
			let parsed: TransactionOperation = op.to_string().parse().unwrap();
			prop_assert_eq!(op, parsed);
		}
	}
}
