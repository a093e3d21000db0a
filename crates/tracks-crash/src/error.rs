// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the crash logging SDK.
//!
//! Only construction and configuration loading can fail. Reporting calls are
//! fire-and-forget and never return these.

use thiserror::Error;

/// Result type alias for crash logging operations.
pub type Result<T> = std::result::Result<T, CrashLoggingError>;

/// Errors that can occur while setting up crash logging.
#[derive(Debug, Error)]
pub enum CrashLoggingError {
	/// No data provider was registered on the builder.
	#[error("a crash logging data provider is required")]
	MissingDataProvider,

	/// The DSN supplied by the data provider could not be parsed.
	#[error("invalid DSN: {0}")]
	InvalidDsn(String),

	/// The transport refused to initialize.
	#[error("error tracker initialization failed: {0}")]
	TrackerInit(String),

	/// Reading a configuration file failed.
	#[error("failed to read config file: {0}")]
	ConfigIo(#[from] std::io::Error),

	/// A configuration file is not valid TOML for this schema.
	#[error("failed to parse config file: {0}")]
	ConfigParse(#[from] toml::de::Error),

	/// An environment override holds a value of the wrong type.
	#[error("invalid value for {var}: {value}")]
	InvalidEnvValue {
		/// Environment variable name.
		var: String,
		/// Offending value.
		value: String,
	},
}
