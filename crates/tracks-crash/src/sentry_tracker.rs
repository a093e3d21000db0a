// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! [`ErrorTracker`] and [`PerformanceMonitor`] backed by the `sentry` crate.
//!
//! The sentry hub is process-wide, so only one tracker should be initialized
//! per process.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sentry::protocol::{Breadcrumb, Event, Level, User};
use sentry::types::Dsn;
use sentry::{ClientInitGuard, ClientOptions, TransactionContext, TransportFactory};
use tracing::{debug, info, warn};
use tracks_crash_core::{TransactionOperation, TransactionStatus};

use crate::error::{CrashLoggingError, Result};
use crate::protocol::span_status;
use crate::tracker::{ErrorTracker, PerformanceMonitor, TrackerOptions, TransactionSpan};

#[derive(Default)]
pub struct SentryErrorTracker {
	guard: Mutex<Option<ClientInitGuard>>,
	transport: Option<Arc<dyn TransportFactory>>,
}

impl SentryErrorTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Uses `transport` instead of the HTTP transport derived from the DSN.
	pub fn with_transport(transport: Arc<dyn TransportFactory>) -> Self {
		Self {
			transport: Some(transport),
			..Default::default()
		}
	}

	pub fn is_initialized(&self) -> bool {
		self.guard.lock().is_some()
	}
}

/// Builds the sentry client options. An empty DSN yields a disabled client.
fn client_options(options: TrackerOptions) -> Result<ClientOptions> {
	let dsn = if options.dsn.trim().is_empty() {
		None
	} else {
		Some(
			options
				.dsn
				.parse::<Dsn>()
				.map_err(|e| CrashLoggingError::InvalidDsn(e.to_string()))?,
		)
	};

	let traces_sampler = options.traces_sampler.map(|sampler| {
		Arc::new(move |ctx: &TransactionContext| sampler(ctx.name()) as f32)
			as Arc<dyn Fn(&TransactionContext) -> f32 + Send + Sync>
	});

	Ok(ClientOptions {
		dsn,
		release: options.release.map(Cow::Owned),
		environment: Some(Cow::Owned(options.environment)),
		debug: options.debug,
		traces_sample_rate: options.traces_sample_rate as f32,
		traces_sampler,
		max_breadcrumbs: options.max_breadcrumbs,
		auto_session_tracking: options.auto_session_tracking,
		before_send: options.before_send,
		before_breadcrumb: options.before_breadcrumb,
		..Default::default()
	})
}

impl ErrorTracker for SentryErrorTracker {
	fn initialize(&self, options: TrackerOptions) -> Result<()> {
		if options.profiles_sample_rate > 0.0 {
			warn!(
				rate = options.profiles_sample_rate,
				"Profiling is not supported by this transport, ignoring profiles sample rate"
			);
		}

		let tags = options.tags.clone();
		let mut client_options = client_options(options)?;
		if let Some(transport) = &self.transport {
			client_options.transport = Some(Arc::clone(transport));
		}
		let has_dsn = client_options.dsn.is_some();
		let guard = sentry::init(client_options);

		sentry::configure_scope(|scope| {
			for (key, value) in &tags {
				scope.set_tag(key, value);
			}
		});

		info!(enabled = guard.is_enabled(), has_dsn, "Sentry client initialized");
		*self.guard.lock() = Some(guard);
		Ok(())
	}

	fn capture_error(&self, error: &dyn std::error::Error) {
		sentry::capture_error(error);
	}

	fn capture_event(&self, event: Event<'static>) {
		sentry::capture_event(event);
	}

	fn capture_message(&self, message: &str, level: Level) {
		sentry::capture_message(message, level);
	}

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		sentry::add_breadcrumb(breadcrumb);
	}

	fn set_user(&self, user: Option<User>) {
		sentry::configure_scope(|scope| scope.set_user(user));
	}

	fn set_tag(&self, key: &str, value: &str) {
		sentry::configure_scope(|scope| scope.set_tag(key, value));
	}

	fn clear_breadcrumbs(&self) {
		sentry::configure_scope(|scope| scope.clear_breadcrumbs());
	}

	fn close(&self, timeout: Duration) -> bool {
		match self.guard.lock().take() {
			Some(guard) => {
				let flushed = guard.close(Some(timeout));
				debug!(flushed, "Sentry client closed");
				flushed
			}
			None => true,
		}
	}
}

impl PerformanceMonitor for SentryErrorTracker {
	fn start_transaction(
		&self,
		name: &str,
		operation: TransactionOperation,
		bind_to_scope: bool,
	) -> Box<dyn TransactionSpan> {
		let ctx = TransactionContext::new(name, operation.as_str());
		let transaction = sentry::start_transaction(ctx);
		if bind_to_scope {
			let span = transaction.clone();
			sentry::configure_scope(|scope| scope.set_span(Some(span.into())));
		}
		Box::new(SentryTransactionSpan {
			transaction,
			bound: bind_to_scope,
		})
	}
}

struct SentryTransactionSpan {
	transaction: sentry::Transaction,
	bound: bool,
}

impl SentryTransactionSpan {
	/// Clears the scope's span if it is still this transaction.
	fn unbind(&self) {
		let span_id = self.transaction.get_trace_context().span_id;
		sentry::configure_scope(|scope| {
			let is_current = scope
				.get_span()
				.is_some_and(|current| current.get_trace_context().span_id == span_id);
			if is_current {
				scope.set_span(None);
			}
		});
	}
}

impl TransactionSpan for SentryTransactionSpan {
	fn finish(self: Box<Self>, status: TransactionStatus) {
		self.transaction.set_status(span_status(status));
		if self.bound {
			self.unbind();
		}
		self.transaction.finish();
	}
}
