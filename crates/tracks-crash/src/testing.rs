// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory fakes for the data provider and the transport seams.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use parking_lot::{Mutex, RwLock};
use sentry::protocol::{Breadcrumb, Event, Level, User};
use tracks_crash_core::{
	ContextUpdate, CrashLoggingDataProvider, CrashLoggingUser, EventLevel, ExtraKnownKey,
	PerformanceMonitoringConfig, PerformanceSampler, ReleaseName, TransactionOperation,
	TransactionStatus,
};

use crate::error::{CrashLoggingError, Result};
use crate::tracker::{ErrorTracker, PerformanceMonitor, TrackerOptions, TransactionSpan};

pub const TEST_DSN: &str = "https://public@example.com/1";

type DropPolicy = Arc<dyn Fn(&str, &str, &str) -> bool + Send + Sync>;
type ExtrasPolicy =
	Arc<dyn Fn(&HashMap<ExtraKnownKey, String>, EventLevel) -> HashMap<ExtraKnownKey, String> + Send + Sync>;

pub struct FakeDataProvider {
	pub dsn: String,
	pub build_type: String,
	pub release_name: ReleaseName,
	pub locale: Option<String>,
	pub enable_logs: bool,
	pub performance_config: PerformanceMonitoringConfig,
	pub sampler: Option<Arc<dyn PerformanceSampler>>,
	enabled: RwLock<bool>,
	opted_out: RwLock<bool>,
	user: RwLock<Option<CrashLoggingUser>>,
	application_context: RwLock<HashMap<String, String>>,
	extra_keys: RwLock<Vec<ExtraKnownKey>>,
	drop_policy: RwLock<DropPolicy>,
	drop_queries: Mutex<Vec<(String, String, String)>>,
	extras_policy: RwLock<ExtrasPolicy>,
	extras_requests: Mutex<Vec<(HashMap<ExtraKnownKey, String>, EventLevel)>>,
	updates: Mutex<Option<BoxStream<'static, ContextUpdate>>>,
}

impl Default for FakeDataProvider {
	fn default() -> Self {
		Self {
			dsn: TEST_DSN.to_string(),
			build_type: "testBuildType".to_string(),
			release_name: ReleaseName::SetByApplication("testReleaseName".to_string()),
			locale: Some("en-US".to_string()),
			enable_logs: true,
			performance_config: PerformanceMonitoringConfig::Disabled,
			sampler: None,
			enabled: RwLock::new(true),
			opted_out: RwLock::new(false),
			user: RwLock::new(None),
			application_context: RwLock::new(HashMap::new()),
			extra_keys: RwLock::new(Vec::new()),
			drop_policy: RwLock::new(Arc::new(|_: &str, _: &str, _: &str| false) as DropPolicy),
			drop_queries: Mutex::new(Vec::new()),
			extras_policy: RwLock::new(Arc::new(
				|_: &HashMap<ExtraKnownKey, String>, _: EventLevel| HashMap::new(),
			) as ExtrasPolicy),
			extras_requests: Mutex::new(Vec::new()),
			updates: Mutex::new(None),
		}
	}
}

impl FakeDataProvider {
	pub fn set_enabled(&self, enabled: bool) {
		*self.enabled.write() = enabled;
	}

	pub fn set_opted_out(&self, opted_out: bool) {
		*self.opted_out.write() = opted_out;
	}

	pub fn set_user(&self, user: Option<CrashLoggingUser>) {
		*self.user.write() = user;
	}

	pub fn set_application_context(&self, context: HashMap<String, String>) {
		*self.application_context.write() = context;
	}

	pub fn set_extra_keys(&self, keys: &[&str]) {
		*self.extra_keys.write() = keys.iter().map(|key| key.to_string()).collect();
	}

	pub fn set_drop_policy(&self, policy: impl Fn(&str, &str, &str) -> bool + Send + Sync + 'static) {
		*self.drop_policy.write() = Arc::new(policy);
	}

	pub fn set_extras_policy(
		&self,
		policy: impl Fn(&HashMap<ExtraKnownKey, String>, EventLevel) -> HashMap<ExtraKnownKey, String>
			+ Send
			+ Sync
			+ 'static,
	) {
		*self.extras_policy.write() = Arc::new(policy);
	}

	pub fn set_updates(&self, updates: BoxStream<'static, ContextUpdate>) {
		*self.updates.lock() = Some(updates);
	}

	pub fn drop_queries(&self) -> Vec<(String, String, String)> {
		self.drop_queries.lock().clone()
	}

	pub fn extras_requests(&self) -> Vec<(HashMap<ExtraKnownKey, String>, EventLevel)> {
		self.extras_requests.lock().clone()
	}
}

impl CrashLoggingDataProvider for FakeDataProvider {
	fn sentry_dsn(&self) -> String {
		self.dsn.clone()
	}

	fn build_type(&self) -> String {
		self.build_type.clone()
	}

	fn release_name(&self) -> ReleaseName {
		self.release_name.clone()
	}

	fn locale(&self) -> Option<String> {
		self.locale.clone()
	}

	fn enable_crash_logging_logs(&self) -> bool {
		self.enable_logs
	}

	fn performance_monitoring_config(&self) -> PerformanceMonitoringConfig {
		self.performance_config
	}

	fn performance_sampler(&self) -> Option<Arc<dyn PerformanceSampler>> {
		self.sampler.clone()
	}

	fn crash_logging_enabled(&self) -> bool {
		*self.enabled.read()
	}

	fn user_has_opted_out(&self) -> bool {
		*self.opted_out.read()
	}

	fn user(&self) -> Option<CrashLoggingUser> {
		self.user.read().clone()
	}

	fn application_context(&self) -> HashMap<String, String> {
		self.application_context.read().clone()
	}

	fn extra_known_keys(&self) -> Vec<ExtraKnownKey> {
		self.extra_keys.read().clone()
	}

	fn should_drop_wrapping_exception(&self, module: &str, ty: &str, value: &str) -> bool {
		self.drop_queries
			.lock()
			.push((module.to_string(), ty.to_string(), value.to_string()));
		let policy = self.drop_policy.read().clone();
		policy(module, ty, value)
	}

	fn provide_extras_for_event(
		&self,
		current_extras: &HashMap<ExtraKnownKey, String>,
		event_level: EventLevel,
	) -> HashMap<ExtraKnownKey, String> {
		self.extras_requests
			.lock()
			.push((current_extras.clone(), event_level));
		let policy = self.extras_policy.read().clone();
		policy(current_extras, event_level)
	}

	fn context_updates(&self) -> Option<BoxStream<'static, ContextUpdate>> {
		self.updates.lock().take()
	}
}

#[derive(Default)]
struct TrackerState {
	options: Option<TrackerOptions>,
	errors: Vec<String>,
	events: Vec<Event<'static>>,
	messages: Vec<(String, Level)>,
	breadcrumbs: Vec<Breadcrumb>,
	user: Option<User>,
	tags: HashMap<String, String>,
	clear_breadcrumbs_count: usize,
	closed: bool,
}

/// Records every call instead of talking to a backend.
#[derive(Default)]
pub struct FakeErrorTracker {
	state: Mutex<TrackerState>,
	fail_init: bool,
}

impl FakeErrorTracker {
	pub fn failing() -> Self {
		Self {
			fail_init: true,
			..Default::default()
		}
	}

	pub fn options(&self) -> TrackerOptions {
		self.state
			.lock()
			.options
			.clone()
			.expect("tracker was not initialized")
	}

	/// Runs an event through the registered before-send hook.
	pub fn before_send(&self, event: Event<'static>) -> Option<Event<'static>> {
		let hook = self.options().before_send.expect("no before_send hook");
		hook(event)
	}

	pub fn before_breadcrumb(&self, breadcrumb: Breadcrumb) -> Option<Breadcrumb> {
		match self.options().before_breadcrumb {
			Some(hook) => hook(breadcrumb),
			None => Some(breadcrumb),
		}
	}

	pub fn errors(&self) -> Vec<String> {
		self.state.lock().errors.clone()
	}

	pub fn events(&self) -> Vec<Event<'static>> {
		self.state.lock().events.clone()
	}

	pub fn last_event(&self) -> Event<'static> {
		self.state
			.lock()
			.events
			.last()
			.cloned()
			.expect("no event captured")
	}

	pub fn messages(&self) -> Vec<(String, Level)> {
		self.state.lock().messages.clone()
	}

	pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
		self.state.lock().breadcrumbs.clone()
	}

	pub fn current_user(&self) -> Option<User> {
		self.state.lock().user.clone()
	}

	pub fn tag(&self, key: &str) -> Option<String> {
		self.state.lock().tags.get(key).cloned()
	}

	pub fn clear_breadcrumbs_count(&self) -> usize {
		self.state.lock().clear_breadcrumbs_count
	}

	pub fn is_closed(&self) -> bool {
		self.state.lock().closed
	}
}

impl ErrorTracker for FakeErrorTracker {
	fn initialize(&self, options: TrackerOptions) -> Result<()> {
		if self.fail_init {
			return Err(CrashLoggingError::TrackerInit("fake failure".to_string()));
		}
		self.state.lock().options = Some(options);
		Ok(())
	}

	fn capture_error(&self, error: &dyn std::error::Error) {
		self.state.lock().errors.push(error.to_string());
	}

	fn capture_event(&self, event: Event<'static>) {
		self.state.lock().events.push(event);
	}

	fn capture_message(&self, message: &str, level: Level) {
		self.state.lock().messages.push((message.to_string(), level));
	}

	fn add_breadcrumb(&self, breadcrumb: Breadcrumb) {
		self.state.lock().breadcrumbs.push(breadcrumb);
	}

	fn set_user(&self, user: Option<User>) {
		self.state.lock().user = user;
	}

	fn set_tag(&self, key: &str, value: &str) {
		self.state
			.lock()
			.tags
			.insert(key.to_string(), value.to_string());
	}

	fn clear_breadcrumbs(&self) {
		let mut state = self.state.lock();
		state.breadcrumbs.clear();
		state.clear_breadcrumbs_count += 1;
	}

	fn close(&self, _timeout: Duration) -> bool {
		self.state.lock().closed = true;
		true
	}
}

/// Records started and finished transactions.
#[derive(Default)]
pub struct FakePerformanceMonitor {
	started: Mutex<Vec<(String, TransactionOperation, bool)>>,
	finished: Arc<Mutex<Vec<(String, TransactionStatus)>>>,
}

impl FakePerformanceMonitor {
	pub fn started(&self) -> Vec<(String, TransactionOperation, bool)> {
		self.started.lock().clone()
	}

	pub fn finished(&self) -> Vec<(String, TransactionStatus)> {
		self.finished.lock().clone()
	}
}

impl PerformanceMonitor for FakePerformanceMonitor {
	fn start_transaction(
		&self,
		name: &str,
		operation: TransactionOperation,
		bind_to_scope: bool,
	) -> Box<dyn TransactionSpan> {
		self.started
			.lock()
			.push((name.to_string(), operation, bind_to_scope));
		Box::new(FakeSpan {
			name: name.to_string(),
			finished: Arc::clone(&self.finished),
		})
	}
}

struct FakeSpan {
	name: String,
	finished: Arc<Mutex<Vec<(String, TransactionStatus)>>>,
}

impl TransactionSpan for FakeSpan {
	fn finish(self: Box<Self>, status: TransactionStatus) {
		self.finished.lock().push((self.name, status));
	}
}
