// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conversions between SDK types and the tracking backend's protocol types.

use std::collections::BTreeMap;

use sentry::protocol::{
	Context, Event, Exception, Frame, Level, Mechanism, SpanStatus, Stacktrace, User,
};
use serde_json::Value;
use tracks_crash_core::{CrashLoggingUser, EventLevel, JsException, TransactionStatus};

/// Tag value used when the provider does not know the locale.
pub const UNKNOWN_LOCALE: &str = "unknown";

/// Key under which a JavaScript report's context is attached.
pub const JS_CONTEXT_KEY: &str = "react_native_context";

/// Key of the user id inside the user's free-form data.
pub const USER_ID_KEY: &str = "userID";

pub fn event_level(level: Level) -> EventLevel {
	match level {
		Level::Debug => EventLevel::Debug,
		Level::Info => EventLevel::Info,
		Level::Warning => EventLevel::Warning,
		Level::Error => EventLevel::Error,
		Level::Fatal => EventLevel::Fatal,
	}
}

pub fn span_status(status: TransactionStatus) -> SpanStatus {
	match status {
		TransactionStatus::Successful => SpanStatus::Ok,
		TransactionStatus::Aborted => SpanStatus::Aborted,
	}
}

/// Maps a provider user onto the backend user.
///
/// The free-form context becomes the user's extra data, with the id repeated
/// under `userID`.
pub fn to_sentry_user(user: &CrashLoggingUser) -> User {
	let mut other: BTreeMap<String, Value> = user
		.context
		.iter()
		.map(|(key, value)| (key.clone(), Value::String(value.clone())))
		.collect();
	other.insert(USER_ID_KEY.to_string(), Value::String(user.user_id.clone()));

	User {
		id: Some(user.user_id.clone()),
		email: Some(user.email.clone()),
		username: Some(user.username.clone()),
		other,
		..Default::default()
	}
}

/// Language subtag of a locale such as `en-US` or `pt_BR`.
pub fn language_tag(locale: Option<&str>) -> String {
	locale
		.and_then(|locale| locale.split(['-', '_']).next())
		.map(str::trim)
		.filter(|language| !language.is_empty())
		.map(str::to_lowercase)
		.unwrap_or_else(|| UNKNOWN_LOCALE.to_string())
}

/// `"<type>: <message>"` description of an error, used for error breadcrumbs.
///
/// The type name is taken from the `Debug` output, so it survives boxing.
pub fn describe_error<E: std::error::Error + ?Sized>(error: &E) -> String {
	let debug = format!("{error:?}");
	format!("{}: {}", sentry::parse_type_from_debug(&debug), error)
}

/// Builds a fatal event out of an exception raised in a JavaScript runtime.
pub fn js_exception_event(exception: JsException) -> Event<'static> {
	let frames = exception
		.stack_trace
		.into_iter()
		.map(|element| Frame {
			filename: element.file_name,
			function: Some(element.function),
			lineno: element.line_number.map(u64::from),
			colno: element.col_number.map(u64::from),
			in_app: Some(true),
			..Default::default()
		})
		.collect();

	let js_exception = Exception {
		ty: exception.ty,
		value: Some(exception.message),
		module: Some("javascript".to_string()),
		stacktrace: Some(Stacktrace {
			frames,
			..Default::default()
		}),
		mechanism: Some(Mechanism {
			ty: exception.handled_by,
			handled: Some(exception.is_handled),
			..Default::default()
		}),
		..Default::default()
	};

	let mut event = Event {
		level: Level::Fatal,
		platform: "javascript".into(),
		..Default::default()
	};
	event.exception.values.push(js_exception);
	event.tags.extend(exception.tags);
	event.contexts.insert(
		JS_CONTEXT_KEY.to_string(),
		Context::Other(exception.context.into_iter().collect()),
	);
	event
}
