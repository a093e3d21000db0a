// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Exceptions forwarded from an embedded JavaScript runtime.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A JavaScript error already unwound by the JS runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsException {
	/// Error constructor name, e.g. `TypeError`.
	#[serde(rename = "type")]
	pub ty: String,
	pub message: String,
	pub stack_trace: Vec<JsExceptionStackTraceElement>,
	/// Free-form context attached to the report as the `react_native_context` context.
	#[serde(default)]
	pub context: HashMap<String, serde_json::Value>,
	#[serde(default)]
	pub tags: HashMap<String, String>,
	pub is_handled: bool,
	/// Name of the handler that caught the error.
	pub handled_by: String,
}

/// One frame of a JavaScript stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsExceptionStackTraceElement {
	pub file_name: Option<String>,
	pub line_number: Option<u32>,
	pub col_number: Option<u32>,
	pub function: String,
}
