// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transport seams.
//!
//! The SDK never talks to the tracking backend directly. Everything that
//! leaves the process goes through an [`ErrorTracker`] (events, breadcrumbs,
//! scope data) or a [`PerformanceMonitor`] (transactions). Network delivery,
//! queuing and retries are the implementation's concern.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use sentry::protocol::{Breadcrumb, Event, Level, User};
use tracks_crash_core::{TransactionOperation, TransactionStatus};

use crate::error::Result;

/// Hook run on every outbound event; `None` suppresses the event.
pub type BeforeSendCallback = Arc<dyn Fn(Event<'static>) -> Option<Event<'static>> + Send + Sync>;

/// Hook run on every breadcrumb; `None` drops the breadcrumb.
pub type BeforeBreadcrumbCallback = Arc<dyn Fn(Breadcrumb) -> Option<Breadcrumb> + Send + Sync>;

/// Per-transaction sample rate, keyed by transaction name.
pub type TracesSampler = Arc<dyn Fn(&str) -> f64 + Send + Sync>;

/// Options handed to [`ErrorTracker::initialize`].
#[derive(Clone, Default)]
pub struct TrackerOptions {
	pub dsn: String,
	pub environment: String,
	pub release: Option<String>,
	pub debug: bool,
	pub traces_sample_rate: f64,
	pub profiles_sample_rate: f64,
	pub traces_sampler: Option<TracesSampler>,
	pub max_breadcrumbs: usize,
	pub auto_session_tracking: bool,
	/// Tags set on the global scope right after initialization.
	pub tags: BTreeMap<String, String>,
	pub before_send: Option<BeforeSendCallback>,
	pub before_breadcrumb: Option<BeforeBreadcrumbCallback>,
}

impl fmt::Debug for TrackerOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackerOptions")
			.field("dsn", &self.dsn)
			.field("environment", &self.environment)
			.field("release", &self.release)
			.field("debug", &self.debug)
			.field("traces_sample_rate", &self.traces_sample_rate)
			.field("profiles_sample_rate", &self.profiles_sample_rate)
			.field("traces_sampler", &self.traces_sampler.is_some())
			.field("max_breadcrumbs", &self.max_breadcrumbs)
			.field("auto_session_tracking", &self.auto_session_tracking)
			.field("tags", &self.tags)
			.field("before_send", &self.before_send.is_some())
			.field("before_breadcrumb", &self.before_breadcrumb.is_some())
			.finish()
	}
}

/// Error tracking backend with a process-wide scope.
pub trait ErrorTracker: Send + Sync {
	fn initialize(&self, options: TrackerOptions) -> Result<()>;

	fn capture_error(&self, error: &dyn std::error::Error);

	fn capture_event(&self, event: Event<'static>);

	fn capture_message(&self, message: &str, level: Level);

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb);

	fn set_user(&self, user: Option<User>);

	fn set_tag(&self, key: &str, value: &str);

	fn clear_breadcrumbs(&self);

	/// Flushes pending events and shuts the backend down.
	///
	/// Returns `false` if the timeout elapsed before everything was sent.
	fn close(&self, timeout: Duration) -> bool;
}

/// Backend capable of recording performance transactions.
pub trait PerformanceMonitor: Send + Sync {
	fn start_transaction(
		&self,
		name: &str,
		operation: TransactionOperation,
		bind_to_scope: bool,
	) -> Box<dyn TransactionSpan>;
}

/// A started transaction owned by the registry until it is finished.
pub trait TransactionSpan: Send {
	fn finish(self: Box<Self>, status: TransactionStatus);
}
