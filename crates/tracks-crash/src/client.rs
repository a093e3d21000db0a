// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash logging façade.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sentry::protocol::{Breadcrumb, Event, Level};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};
use tracks_crash_core::{
	ContextSnapshot, CrashLoggingDataProvider, JsException, PerformanceMonitoringConfig,
	TransactionId, TransactionOperation, TransactionStatus,
};

use crate::config::CrashLoggingConfig;
use crate::context::{ContextCache, ContextSync};
use crate::error::{CrashLoggingError, Result};
use crate::performance::TransactionRegistry;
use crate::pipeline::EventEnricher;
use crate::protocol::{describe_error, js_exception_event, language_tag, to_sentry_user};
use crate::sentry_tracker::SentryErrorTracker;
use crate::tracker::{
	BeforeBreadcrumbCallback, BeforeSendCallback, ErrorTracker, PerformanceMonitor, TracesSampler,
	TrackerOptions,
};

/// Scope tag carrying the language part of the provider's locale.
pub const LOCALE_TAG: &str = "locale";

const HTTP_BREADCRUMB_TYPE: &str = "http";

/// Builder for constructing a [`CrashLogging`].
#[derive(Default)]
pub struct CrashLoggingBuilder {
	data_provider: Option<Arc<dyn CrashLoggingDataProvider>>,
	tracker: Option<Arc<dyn ErrorTracker>>,
	performance_monitor: Option<Arc<dyn PerformanceMonitor>>,
	config: CrashLoggingConfig,
	runtime: Option<Handle>,
}

impl CrashLoggingBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the data provider. Required.
	///
	/// The provider supplies the DSN, release, user and application context,
	/// and answers the consent checks made for every outbound event.
	pub fn data_provider(mut self, provider: Arc<dyn CrashLoggingDataProvider>) -> Self {
		self.data_provider = Some(provider);
		self
	}

	/// Replaces the default sentry transport.
	///
	/// The tracker is initialized by [`build`](Self::build) and closed by
	/// [`CrashLogging::shutdown`].
	pub fn tracker(mut self, tracker: Arc<dyn ErrorTracker>) -> Self {
		self.tracker = Some(tracker);
		self
	}

	/// Replaces the default sentry performance monitor.
	///
	/// Only transactions go through the monitor; events and breadcrumbs always
	/// use the tracker.
	pub fn performance_monitor(mut self, monitor: Arc<dyn PerformanceMonitor>) -> Self {
		self.performance_monitor = Some(monitor);
		self
	}

	/// Sets the SDK configuration.
	///
	/// Example: `CrashLoggingConfig::load(Some(path))?` to layer a TOML file
	/// and `TRACKS_CRASH_*` variables over the defaults.
	pub fn config(mut self, config: CrashLoggingConfig) -> Self {
		self.config = config;
		self
	}

	/// Runtime used for the context update task.
	///
	/// Defaults to the runtime the builder is called from, if any.
	pub fn runtime(mut self, handle: Handle) -> Self {
		self.runtime = Some(handle);
		self
	}

	/// Initializes the transport and returns the façade.
	///
	/// Fails when no data provider was set or the tracker rejects its options,
	/// for example because of a malformed DSN.
	pub fn build(self) -> Result<CrashLogging> {
		let provider = self
			.data_provider
			.ok_or(CrashLoggingError::MissingDataProvider)?;

		let sentry = Arc::new(SentryErrorTracker::new());
		let tracker: Arc<dyn ErrorTracker> = match self.tracker {
			Some(tracker) => tracker,
			None => sentry.clone(),
		};
		let monitor: Arc<dyn PerformanceMonitor> = match self.performance_monitor {
			Some(monitor) => monitor,
			None => sentry,
		};

		let context = Arc::new(ContextCache::new());
		let enricher = EventEnricher::new(Arc::clone(&provider), Arc::clone(&context));
		let options = tracker_options(provider.as_ref(), &self.config, enricher);
		debug!(?options, "Initializing error tracker");
		tracker.initialize(options)?;

		let snapshot = ContextSnapshot::from_provider(provider.as_ref());
		tracker.set_user(snapshot.user.as_ref().map(to_sentry_user));
		context.replace(snapshot);

		let context_sync = provider.context_updates().and_then(|updates| {
			match self.runtime.or_else(|| Handle::try_current().ok()) {
				Some(runtime) => Some(ContextSync::start(
					&runtime,
					updates,
					Arc::clone(&context),
					Arc::clone(&tracker),
				)),
				None => {
					warn!("No tokio runtime available, polling the data provider for context instead");
					None
				}
			}
		});

		let registry = TransactionRegistry::new(monitor, self.config.bind_transactions_to_scope);

		info!(
			subscribed = context_sync.is_some(),
			"Crash logging initialized"
		);

		Ok(CrashLogging {
			inner: Arc::new(CrashLoggingInner {
				provider,
				tracker,
				registry,
				context,
				context_sync,
				config: self.config,
				closed: AtomicBool::new(false),
			}),
		})
	}
}

fn tracker_options(
	provider: &dyn CrashLoggingDataProvider,
	config: &CrashLoggingConfig,
	enricher: EventEnricher,
) -> TrackerOptions {
	let performance = provider.performance_monitoring_config();

	let traces_sampler = match performance {
		PerformanceMonitoringConfig::Enabled { .. } => {
			provider.performance_sampler().map(|sampler| {
				Arc::new(move |name: &str| sampler.sample(name).traces_sample_rate())
					as TracesSampler
			})
		}
		PerformanceMonitoringConfig::Disabled => None,
	};

	let before_breadcrumb = config.drop_http_breadcrumbs.then(|| {
		Arc::new(|breadcrumb: Breadcrumb| {
			(breadcrumb.ty != HTTP_BREADCRUMB_TYPE).then_some(breadcrumb)
		}) as BeforeBreadcrumbCallback
	});

	let before_send: BeforeSendCallback =
		Arc::new(move |event: Event<'static>| enricher.process(event));

	TrackerOptions {
		dsn: provider.sentry_dsn(),
		environment: provider.build_type(),
		release: provider
			.release_name()
			.as_application_release()
			.map(str::to_string),
		debug: provider.enable_crash_logging_logs(),
		traces_sample_rate: performance.traces_sample_rate(),
		profiles_sample_rate: performance.profiles_sample_rate(),
		traces_sampler,
		max_breadcrumbs: config.max_breadcrumbs,
		auto_session_tracking: config.auto_session_tracking,
		tags: BTreeMap::from([(
			LOCALE_TAG.to_string(),
			language_tag(provider.locale().as_deref()),
		)]),
		before_send: Some(before_send),
		before_breadcrumb,
	}
}

struct CrashLoggingInner {
	provider: Arc<dyn CrashLoggingDataProvider>,
	tracker: Arc<dyn ErrorTracker>,
	registry: TransactionRegistry,
	context: Arc<ContextCache>,
	context_sync: Option<ContextSync>,
	config: CrashLoggingConfig,
	closed: AtomicBool,
}

/// Handle for reporting errors, messages and breadcrumbs.
///
/// Cloning is cheap; every clone shares the same transport, context cache and
/// transaction registry. Reporting methods never fail: once [`shutdown`] has
/// been called they do nothing.
///
/// # Example
///
/// ```ignore
/// let crash_logging = CrashLogging::builder()
///     .data_provider(Arc::new(AppDataProvider::new()))
///     .build()?;
///
/// crash_logging.record_event("opened editor", Some("ui"));
/// if let Err(e) = save_post() {
///     crash_logging.log_error(&e);
/// }
///
/// crash_logging.shutdown();
/// ```
///
/// [`shutdown`]: CrashLogging::shutdown
#[derive(Clone)]
pub struct CrashLogging {
	inner: Arc<CrashLoggingInner>,
}

impl CrashLogging {
	/// Creates a new builder for constructing a `CrashLogging`.
	pub fn builder() -> CrashLoggingBuilder {
		CrashLoggingBuilder::new()
	}

	fn is_closed(&self) -> bool {
		self.inner.closed.load(Ordering::Acquire)
	}

	fn capture_event(&self, event: Event<'static>) {
		if self.is_closed() {
			debug!("Crash logging shut down, ignoring event");
			return;
		}
		self.inner.tracker.capture_event(event);
	}

	/// Reports an error with its source chain.
	pub fn log_error(&self, error: &dyn std::error::Error) {
		if self.is_closed() {
			return;
		}
		self.inner.tracker.capture_error(error);
	}

	/// Reports an error together with free-form extra data.
	///
	/// The event message is the error's text. `None` values are sent as null.
	pub fn log_error_with_data(
		&self,
		error: &dyn std::error::Error,
		data: HashMap<String, Option<String>>,
	) {
		let extras = data
			.into_iter()
			.map(|(key, value)| (key, value.map_or(Value::Null, Value::String)))
			.collect();
		let event = build_report(
			Some(error),
			Some(error.to_string()),
			HashMap::new(),
			extras,
		);
		self.capture_event(event);
	}

	pub fn log_message(&self, message: &str) {
		if self.is_closed() {
			return;
		}
		self.inner.tracker.capture_message(message, Level::Info);
	}

	/// Sends a report with explicit tags and message.
	///
	/// The level is `Error` when an exception is given and `Info` otherwise.
	/// The supplied tags take precedence over application context tags.
	pub fn send_report(
		&self,
		exception: Option<&dyn std::error::Error>,
		tags: HashMap<String, String>,
		message: Option<&str>,
	) {
		let event = build_report(
			exception,
			message.map(str::to_string),
			tags,
			BTreeMap::new(),
		);
		self.capture_event(event);
	}

	/// Leaves an informational breadcrumb.
	pub fn record_event(&self, message: &str, category: Option<&str>) {
		self.add_breadcrumb(Breadcrumb {
			ty: "default".into(),
			category: category.map(str::to_string),
			message: Some(message.to_string()),
			level: Level::Info,
			..Default::default()
		});
	}

	/// Leaves an error breadcrumb describing `exception`.
	pub fn record_exception<E: std::error::Error + ?Sized>(
		&self,
		exception: &E,
		category: Option<&str>,
	) {
		self.add_breadcrumb(Breadcrumb {
			ty: "error".into(),
			category: category.map(str::to_string),
			message: Some(describe_error(exception)),
			level: Level::Error,
			..Default::default()
		});
	}

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		if self.is_closed() {
			return;
		}
		self.inner.tracker.add_breadcrumb(breadcrumb);
	}

	/// Sets each entry as a tag on the transport scope.
	pub fn append_application_context(&self, context: HashMap<String, String>) {
		if self.is_closed() {
			return;
		}
		for (key, value) in &context {
			self.inner.tracker.set_tag(key, value);
		}
	}

	/// Reports an exception raised in an embedded JavaScript runtime.
	///
	/// Returns whether the report was handed to the transport.
	pub fn send_javascript_report(&self, exception: JsException) -> bool {
		if self.is_closed() {
			debug!("Crash logging shut down, ignoring JavaScript report");
			return false;
		}
		self.inner
			.tracker
			.capture_event(js_exception_event(exception));
		true
	}

	/// Re-reads user and application context, dropping collected breadcrumbs.
	///
	/// Call after sign-in or sign-out.
	pub fn refresh_context(&self) {
		self.inner.tracker.clear_breadcrumbs();
		let snapshot = ContextSnapshot::from_provider(self.inner.provider.as_ref());
		self.inner
			.tracker
			.set_user(snapshot.user.as_ref().map(to_sentry_user));
		self.inner.context.replace(snapshot);
		debug!("Crash logging context refreshed");
	}

	pub fn start_transaction(&self, name: &str, operation: TransactionOperation) -> TransactionId {
		self.inner.registry.start_transaction(name, operation)
	}

	pub fn finish_transaction(&self, id: TransactionId, status: TransactionStatus) {
		self.inner.registry.finish_transaction(id, status);
	}

	/// Panics on purpose, to verify crash reporting end to end.
	pub fn trigger_test_crash(&self) -> ! {
		panic!("This is a sample crash");
	}

	/// Stops context updates and flushes the transport. Safe to call repeatedly.
	pub fn shutdown(&self) {
		if self.inner.closed.swap(true, Ordering::AcqRel) {
			return;
		}
		if let Some(sync) = &self.inner.context_sync {
			sync.stop();
		}
		let flushed = self.inner.tracker.close(self.inner.config.shutdown_timeout);
		if flushed {
			info!("Crash logging shut down");
		} else {
			warn!(
				timeout_ms = self.inner.config.shutdown_timeout.as_millis() as u64,
				"Crash logging shut down before all events were sent"
			);
		}
	}
}

/// Shared event construction for [`CrashLogging::log_error_with_data`] and
/// [`CrashLogging::send_report`].
fn build_report(
	exception: Option<&dyn std::error::Error>,
	message: Option<String>,
	tags: HashMap<String, String>,
	extras: BTreeMap<String, Value>,
) -> Event<'static> {
	let mut event = match exception {
		Some(exception) => sentry::event_from_error(exception),
		None => Event::default(),
	};
	event.level = if exception.is_some() {
		Level::Error
	} else {
		Level::Info
	};
	event.message = message;
	event.tags.extend(tags);
	event.extra.extend(extras);
	event
}
