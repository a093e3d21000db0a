// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The data provider contract implemented by host applications.
//!
//! A [`CrashLoggingDataProvider`] is registered once when the SDK is built and
//! is read on every outbound event. Values that change over time (current user,
//! application context) can either be returned from the synchronous getters,
//! which are polled at send time, or pushed through [`context_updates`], in
//! which case the SDK keeps a locally cached snapshot.
//!
//! [`context_updates`]: CrashLoggingDataProvider::context_updates

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::{CrashCoreError, Result};
use crate::level::EventLevel;
use crate::performance::PerformanceSampler;
use crate::user::CrashLoggingUser;

/// Key of an extra value computed just before an event is sent.
pub type ExtraKnownKey = String;

/// Release identifier reported with every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReleaseName {
	/// The application names the release explicitly.
	SetByApplication(String),
	/// Leave the release unset and let the tracking backend derive it.
	SetByTracksLibrary,
}

impl ReleaseName {
	pub fn as_application_release(&self) -> Option<&str> {
		match self {
			Self::SetByApplication(name) => Some(name),
			Self::SetByTracksLibrary => None,
		}
	}
}

/// Whether performance transactions are recorded, and at what rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PerformanceMonitoringConfig {
	Disabled,
	Enabled {
		sample_rate: f64,
		profiles_sample_rate: f64,
	},
}

impl PerformanceMonitoringConfig {
	/// Builds an enabled configuration, rejecting rates outside `0.0..=1.0`.
	pub fn enabled(sample_rate: f64, profiles_sample_rate: f64) -> Result<Self> {
		for rate in [sample_rate, profiles_sample_rate] {
			if !(0.0..=1.0).contains(&rate) {
				return Err(CrashCoreError::InvalidSampleRate(rate));
			}
		}
		Ok(Self::Enabled {
			sample_rate,
			profiles_sample_rate,
		})
	}

	pub fn traces_sample_rate(&self) -> f64 {
		match self {
			Self::Disabled => 0.0,
			Self::Enabled { sample_rate, .. } => *sample_rate,
		}
	}

	pub fn profiles_sample_rate(&self) -> f64 {
		match self {
			Self::Disabled => 0.0,
			Self::Enabled {
				profiles_sample_rate,
				..
			} => *profiles_sample_rate,
		}
	}
}

/// A change pushed by the host application through [`CrashLoggingDataProvider::context_updates`].
#[derive(Debug, Clone, PartialEq)]
pub enum ContextUpdate {
	User(Option<CrashLoggingUser>),
	ApplicationContext(HashMap<String, String>),
}

/// Last known user and application context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSnapshot {
	pub user: Option<CrashLoggingUser>,
	pub application_context: HashMap<String, String>,
}

impl ContextSnapshot {
	/// Reads a fresh snapshot through the provider's synchronous getters.
	pub fn from_provider(provider: &dyn CrashLoggingDataProvider) -> Self {
		Self {
			user: provider.user(),
			application_context: provider.application_context(),
		}
	}

	/// Replaces the part of the snapshot named by `update`.
	pub fn apply(&mut self, update: ContextUpdate) {
		match update {
			ContextUpdate::User(user) => self.user = user,
			ContextUpdate::ApplicationContext(context) => self.application_context = context,
		}
	}
}

/// Source of configuration, identity and policy for the crash logging SDK.
///
/// Every method is called synchronously, possibly from the transport's delivery
/// thread, so implementations must return quickly from already-known state.
pub trait CrashLoggingDataProvider: Send + Sync {
	/// Ingestion endpoint (DSN) of the tracking project. Empty disables delivery.
	fn sentry_dsn(&self) -> String;

	/// Build flavour, reported as the event environment.
	fn build_type(&self) -> String;

	fn release_name(&self) -> ReleaseName;

	/// Current locale, e.g. `en-US` or `pt_BR`.
	fn locale(&self) -> Option<String>;

	/// Whether the transport itself should emit debug logs.
	fn enable_crash_logging_logs(&self) -> bool;

	fn performance_monitoring_config(&self) -> PerformanceMonitoringConfig {
		PerformanceMonitoringConfig::Disabled
	}

	/// Per-transaction sampling decision; overrides the flat sample rate when set.
	fn performance_sampler(&self) -> Option<Arc<dyn PerformanceSampler>> {
		None
	}

	/// Master switch. When `false` every event is suppressed.
	fn crash_logging_enabled(&self) -> bool;

	/// User-level opt out, checked alongside [`crash_logging_enabled`].
	///
	/// [`crash_logging_enabled`]: CrashLoggingDataProvider::crash_logging_enabled
	fn user_has_opted_out(&self) -> bool {
		false
	}

	fn user(&self) -> Option<CrashLoggingUser>;

	/// Key/value pairs applied as tags on every event.
	fn application_context(&self) -> HashMap<String, String> {
		HashMap::new()
	}

	/// Extra keys that must be present on every event.
	fn extra_known_keys(&self) -> Vec<ExtraKnownKey> {
		Vec::new()
	}

	/// Whether the last exception of a chain is a wrapper worth dropping.
	///
	/// Absent fields are passed as empty strings.
	fn should_drop_wrapping_exception(&self, _module: &str, _ty: &str, _value: &str) -> bool {
		false
	}

	/// Computes values for the known extra keys.
	///
	/// `current_extras` holds the known keys the event already carries.
	fn provide_extras_for_event(
		&self,
		_current_extras: &HashMap<ExtraKnownKey, String>,
		_event_level: EventLevel,
	) -> HashMap<ExtraKnownKey, String> {
		HashMap::new()
	}

	/// Stream of user/application context changes.
	///
	/// Called once at startup. When `Some`, the SDK caches the latest values and
	/// stops polling [`user`] and [`application_context`] at send time.
	///
	/// [`user`]: CrashLoggingDataProvider::user
	/// [`application_context`]: CrashLoggingDataProvider::application_context
	fn context_updates(&self) -> Option<BoxStream<'static, ContextUpdate>> {
		None
	}
}
