// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Before-send enrichment.
//!
//! Every outbound event passes through [`EventEnricher::process`], which runs
//! these steps in order:
//!
//! 1. suppression, when crash logging is disabled or the user opted out;
//! 2. removal of the last exception of the chain if the provider flags it as
//!    a wrapper;
//! 3. known extras, filled in for keys the event does not carry yet;
//! 4. user and application context from the latest snapshot.
//!
//! Provider callbacks run behind `catch_unwind`. A panicking callback is
//! logged and replaced by a neutral result so the pipeline itself never
//! unwinds into the transport.
//!
//! A panic hook still runs before `catch_unwind` regains control, and the
//! sentry panic integration captures an event from it on the same thread.
//! Events raised while enrichment is already running on a thread are
//! dropped, so that capture never re-enters a panicking provider.

use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use sentry::protocol::Event;
use serde_json::Value;
use tracing::{debug, warn};
use tracks_crash_core::{ContextSnapshot, CrashLoggingDataProvider, ExtraKnownKey};

use crate::context::ContextCache;
use crate::protocol::{event_level, to_sentry_user};

thread_local! {
	static ENRICHING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as enriching until dropped.
struct EnrichingGuard;

impl EnrichingGuard {
	fn enter() -> Option<Self> {
		// Built lazily: a discarded guard would clear the flag on drop.
		ENRICHING.with(|enriching| (!enriching.replace(true)).then(|| EnrichingGuard))
	}
}

impl Drop for EnrichingGuard {
	fn drop(&mut self) {
		ENRICHING.with(|enriching| enriching.set(false));
	}
}

pub struct EventEnricher {
	provider: Arc<dyn CrashLoggingDataProvider>,
	context: Arc<ContextCache>,
}

impl EventEnricher {
	pub fn new(provider: Arc<dyn CrashLoggingDataProvider>, context: Arc<ContextCache>) -> Self {
		Self { provider, context }
	}

	/// Runs the enrichment steps. `None` means the event must not be sent.
	pub fn process(&self, mut event: Event<'static>) -> Option<Event<'static>> {
		let Some(_guard) = EnrichingGuard::enter() else {
			debug!(event_id = %event.event_id, "Event raised during enrichment, dropping it");
			return None;
		};

		if self.should_suppress() {
			debug!(event_id = %event.event_id, "Crash logging disabled, dropping event");
			return None;
		}

		self.drop_wrapping_exception(&mut event);
		self.append_known_extras(&mut event);
		self.append_context(&mut event);

		Some(event)
	}

	fn should_suppress(&self) -> bool {
		// An unanswerable consent check counts as "do not send".
		guarded("suppression", true, || {
			!self.provider.crash_logging_enabled() || self.provider.user_has_opted_out()
		})
	}

	fn drop_wrapping_exception(&self, event: &mut Event<'static>) {
		let Some(last) = event.exception.values.last() else {
			return;
		};

		let module = last.module.as_deref().unwrap_or_default();
		let ty = last.ty.as_str();
		let value = last.value.as_deref().unwrap_or_default();

		let should_drop = guarded("drop_wrapping_exception", false, || {
			self.provider.should_drop_wrapping_exception(module, ty, value)
		});

		if should_drop {
			debug!(ty, "Dropping wrapping exception");
			event.exception.values.pop();
		}
	}

	fn append_known_extras(&self, event: &mut Event<'static>) {
		let known_keys = guarded("extra_known_keys", Vec::new(), || {
			self.provider.extra_known_keys()
		});
		if known_keys.is_empty() {
			return;
		}

		let current: HashMap<ExtraKnownKey, String> = known_keys
			.iter()
			.filter_map(|key| {
				event
					.extra
					.get(key)
					.map(|value| (key.clone(), extra_as_string(value)))
			})
			.collect();

		let level = event_level(event.level);
		let mut provided = guarded("provide_extras_for_event", HashMap::new(), || {
			self.provider.provide_extras_for_event(&current, level)
		});

		for key in known_keys {
			if event.extra.contains_key(&key) {
				continue;
			}
			let value = provided.remove(&key).unwrap_or_default();
			event.extra.insert(key, Value::String(value));
		}
	}

	fn append_context(&self, event: &mut Event<'static>) {
		let snapshot = guarded("context", ContextSnapshot::default(), || {
			self.context.current(self.provider.as_ref())
		});

		if let Some(user) = &snapshot.user {
			event.user = Some(to_sentry_user(user));
		}

		for (key, value) in snapshot.application_context {
			event.tags.entry(key).or_insert(value);
		}
	}
}

fn extra_as_string(value: &Value) -> String {
	match value {
		Value::String(value) => value.clone(),
		other => other.to_string(),
	}
}

/// Runs a provider callback, substituting `fallback` if it panics.
fn guarded<T>(step: &'static str, fallback: T, f: impl FnOnce() -> T) -> T {
	match catch_unwind(AssertUnwindSafe(f)) {
		Ok(value) => value,
		Err(_) => {
			warn!(step, "Data provider panicked during event enrichment");
			fallback
		}
	}
}
