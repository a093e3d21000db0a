// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Example: Report errors, breadcrumbs and a transaction with tracks-crash.
//!
//! Run with:
//!   SENTRY_DSN=https://key@o0.ingest.sentry.io/0 RUST_LOG=tracks_crash=debug \
//!     cargo run --example report -p tracks-crash

use std::collections::HashMap;
use std::sync::Arc;

use futures::channel::mpsc;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;
use tracks_crash::{
	ContextUpdate, CrashLogging, CrashLoggingConfig, CrashLoggingDataProvider, CrashLoggingUser,
	EventLevel, ExtraKnownKey, PerformanceMonitoringConfig, ReleaseName, TransactionOperation,
	TransactionStatus,
};

struct ExampleDataProvider {
	dsn: String,
	updates: Mutex<Option<mpsc::UnboundedReceiver<ContextUpdate>>>,
}

impl CrashLoggingDataProvider for ExampleDataProvider {
	fn sentry_dsn(&self) -> String {
		self.dsn.clone()
	}

	fn build_type(&self) -> String {
		"development".to_string()
	}

	fn release_name(&self) -> ReleaseName {
		ReleaseName::SetByApplication(format!("example@{}", env!("CARGO_PKG_VERSION")))
	}

	fn locale(&self) -> Option<String> {
		std::env::var("LANG").ok()
	}

	fn enable_crash_logging_logs(&self) -> bool {
		false
	}

	fn performance_monitoring_config(&self) -> PerformanceMonitoringConfig {
		PerformanceMonitoringConfig::Enabled {
			sample_rate: 1.0,
			profiles_sample_rate: 0.0,
		}
	}

	fn crash_logging_enabled(&self) -> bool {
		true
	}

	fn user(&self) -> Option<CrashLoggingUser> {
		None
	}

	fn extra_known_keys(&self) -> Vec<ExtraKnownKey> {
		vec!["screen".to_string()]
	}

	fn provide_extras_for_event(
		&self,
		_current_extras: &HashMap<ExtraKnownKey, String>,
		_event_level: EventLevel,
	) -> HashMap<ExtraKnownKey, String> {
		HashMap::from([("screen".to_string(), "example".to_string())])
	}

	fn context_updates(&self) -> Option<BoxStream<'static, ContextUpdate>> {
		self.updates.lock().take().map(|receiver| receiver.boxed())
	}
}

#[derive(Debug, thiserror::Error)]
#[error("failed to load posts")]
struct LoadPostsError(#[source] std::io::Error);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let dsn = std::env::var("SENTRY_DSN").unwrap_or_default();
	if dsn.is_empty() {
		println!("SENTRY_DSN not set, events will not leave the process");
	}

	let (updates, receiver) = mpsc::unbounded();
	let crash_logging = CrashLogging::builder()
		.data_provider(Arc::new(ExampleDataProvider {
			dsn,
			updates: Mutex::new(Some(receiver)),
		}))
		.config(CrashLoggingConfig::load(None)?)
		.build()?;

	updates.unbounded_send(ContextUpdate::User(Some(
		CrashLoggingUser::new("example_user_123", "example@example.com", "example_user")
			.with_context("plan", "free"),
	)))?;

	crash_logging.append_application_context(HashMap::from([(
		"example".to_string(),
		"true".to_string(),
	)]));

	let transaction = crash_logging.start_transaction("load posts", TransactionOperation::UiLoad);
	crash_logging.record_event("Application started", Some("startup"));

	let error = LoadPostsError(std::io::Error::new(
		std::io::ErrorKind::TimedOut,
		"connection timed out",
	));
	crash_logging.record_exception(&error, Some("network"));
	crash_logging.log_error(&error);
	crash_logging.send_report(None, HashMap::new(), Some("Example report from tracks-crash"));

	crash_logging.finish_transaction(transaction, TransactionStatus::Aborted);

	crash_logging.shutdown();
	println!("Crash logging shut down.");

	Ok(())
}
