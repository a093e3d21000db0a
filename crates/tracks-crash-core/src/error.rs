// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for crash logging core types.

use thiserror::Error;

/// Errors raised while parsing or validating core types.
#[derive(Debug, Error, PartialEq)]
pub enum CrashCoreError {
	#[error("invalid event level: {0}")]
	InvalidEventLevel(String),

	#[error("invalid transaction status: {0}")]
	InvalidTransactionStatus(String),

	#[error("invalid transaction operation: {0}")]
	InvalidTransactionOperation(String),

	#[error("sample rate must be within 0.0..=1.0, got {0}")]
	InvalidSampleRate(f64),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CrashCoreError>;
