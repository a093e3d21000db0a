// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SDK configuration.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! `TRACKS_CRASH_*` environment variables. Identity and endpoint settings are
//! not configured here; they come from the data provider.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CrashLoggingError, Result};

/// Maximum number of breadcrumbs kept by the transport.
pub const DEFAULT_MAX_BREADCRUMBS: usize = 100;
/// Time allowed for queued events to flush on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT_MS: u64 = 2_000;

const ENV_PREFIX: &str = "TRACKS_CRASH_";

/// A partial configuration from one source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CrashLoggingConfigLayer {
	pub max_breadcrumbs: Option<usize>,
	pub drop_http_breadcrumbs: Option<bool>,
	pub auto_session_tracking: Option<bool>,
	pub bind_transactions_to_scope: Option<bool>,
	pub shutdown_timeout_ms: Option<u64>,
}

impl CrashLoggingConfigLayer {
	pub fn from_toml_str(contents: &str) -> Result<Self> {
		Ok(toml::from_str(contents)?)
	}

	pub fn from_file(path: &Path) -> Result<Self> {
		let contents = std::fs::read_to_string(path)?;
		Self::from_toml_str(&contents)
	}

	/// Reads `TRACKS_CRASH_*` variables from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_vars(std::env::vars())
	}

	/// Reads `TRACKS_CRASH_*` entries from an arbitrary variable list.
	pub fn from_vars<I>(vars: I) -> Result<Self>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		let mut layer = Self::default();
		for (key, value) in vars {
			let Some(name) = key.strip_prefix(ENV_PREFIX) else {
				continue;
			};
			match name {
				"MAX_BREADCRUMBS" => layer.max_breadcrumbs = Some(parse_env(&key, &value)?),
				"DROP_HTTP_BREADCRUMBS" => {
					layer.drop_http_breadcrumbs = Some(parse_env(&key, &value)?)
				}
				"AUTO_SESSION_TRACKING" => {
					layer.auto_session_tracking = Some(parse_env(&key, &value)?)
				}
				"BIND_TRANSACTIONS_TO_SCOPE" => {
					layer.bind_transactions_to_scope = Some(parse_env(&key, &value)?)
				}
				"SHUTDOWN_TIMEOUT_MS" => layer.shutdown_timeout_ms = Some(parse_env(&key, &value)?),
				_ => {}
			}
		}
		Ok(layer)
	}

	pub fn merge(&mut self, other: Self) {
		if other.max_breadcrumbs.is_some() {
			self.max_breadcrumbs = other.max_breadcrumbs;
		}
		if other.drop_http_breadcrumbs.is_some() {
			self.drop_http_breadcrumbs = other.drop_http_breadcrumbs;
		}
		if other.auto_session_tracking.is_some() {
			self.auto_session_tracking = other.auto_session_tracking;
		}
		if other.bind_transactions_to_scope.is_some() {
			self.bind_transactions_to_scope = other.bind_transactions_to_scope;
		}
		if other.shutdown_timeout_ms.is_some() {
			self.shutdown_timeout_ms = other.shutdown_timeout_ms;
		}
	}

	pub fn finalize(self) -> CrashLoggingConfig {
		CrashLoggingConfig {
			max_breadcrumbs: self.max_breadcrumbs.unwrap_or(DEFAULT_MAX_BREADCRUMBS),
			drop_http_breadcrumbs: self.drop_http_breadcrumbs.unwrap_or(true),
			auto_session_tracking: self.auto_session_tracking.unwrap_or(true),
			bind_transactions_to_scope: self.bind_transactions_to_scope.unwrap_or(true),
			shutdown_timeout: Duration::from_millis(
				self.shutdown_timeout_ms.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_MS),
			),
		}
	}
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T> {
	value
		.trim()
		.parse()
		.map_err(|_| CrashLoggingError::InvalidEnvValue {
			var: var.to_string(),
			value: value.to_string(),
		})
}

/// Resolved SDK configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CrashLoggingConfig {
	pub max_breadcrumbs: usize,
	/// Drop breadcrumbs of type `http` before they reach the transport.
	pub drop_http_breadcrumbs: bool,
	pub auto_session_tracking: bool,
	/// Bind started transactions to the current scope so events link to them.
	pub bind_transactions_to_scope: bool,
	pub shutdown_timeout: Duration,
}

impl Default for CrashLoggingConfig {
	fn default() -> Self {
		CrashLoggingConfigLayer::default().finalize()
	}
}

impl CrashLoggingConfig {
	/// Loads defaults, then `path` if given, then the environment.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let mut layer = CrashLoggingConfigLayer::default();
		if let Some(path) = path {
			layer.merge(CrashLoggingConfigLayer::from_file(path)?);
		}
		layer.merge(CrashLoggingConfigLayer::from_env()?);
		Ok(layer.finalize())
	}
}
