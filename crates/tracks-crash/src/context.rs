// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Last-known user and application context.
//!
//! When the data provider offers a context update stream, a background task
//! consumes it and keeps [`ContextCache`] current; the enrichment pipeline then
//! reads the cached snapshot without waiting. Without a stream the cache is
//! bypassed and the provider's getters are polled at send time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use tracks_crash_core::{ContextSnapshot, ContextUpdate, CrashLoggingDataProvider};

use crate::protocol::to_sentry_user;
use crate::tracker::ErrorTracker;

/// Snapshot of user and application context shared with the pipeline.
#[derive(Debug, Default)]
pub struct ContextCache {
	subscribed: AtomicBool,
	snapshot: RwLock<ContextSnapshot>,
}

impl ContextCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Latest context: the cached snapshot when subscribed, a fresh poll otherwise.
	pub fn current(&self, provider: &dyn CrashLoggingDataProvider) -> ContextSnapshot {
		if self.is_subscribed() {
			self.snapshot.read().clone()
		} else {
			ContextSnapshot::from_provider(provider)
		}
	}

	pub fn is_subscribed(&self) -> bool {
		self.subscribed.load(Ordering::Acquire)
	}

	pub fn replace(&self, snapshot: ContextSnapshot) {
		*self.snapshot.write() = snapshot;
	}

	pub fn apply(&self, update: ContextUpdate) {
		self.snapshot.write().apply(update);
	}

	fn mark_subscribed(&self) {
		self.subscribed.store(true, Ordering::Release);
	}
}

/// Background task feeding provider context updates into the cache.
///
/// The task is aborted by [`ContextSync::stop`] or when this handle is dropped.
#[derive(Debug)]
pub struct ContextSync {
	task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ContextSync {
	/// Spawns the sync task on `runtime`.
	pub fn start(
		runtime: &Handle,
		updates: BoxStream<'static, ContextUpdate>,
		cache: Arc<ContextCache>,
		tracker: Arc<dyn ErrorTracker>,
	) -> Self {
		cache.mark_subscribed();
		let handle = runtime.spawn(run_context_sync(updates, cache, tracker));
		info!("Context sync started");
		Self {
			task_handle: Mutex::new(Some(handle)),
		}
	}

	pub fn stop(&self) {
		if let Some(handle) = self.task_handle.lock().take() {
			handle.abort();
			debug!("Context sync stopped");
		}
	}

	pub fn is_running(&self) -> bool {
		self
			.task_handle
			.lock()
			.as_ref()
			.is_some_and(|handle| !handle.is_finished())
	}
}

impl Drop for ContextSync {
	fn drop(&mut self) {
		if let Some(handle) = self.task_handle.get_mut().take() {
			handle.abort();
		}
	}
}

async fn run_context_sync(
	mut updates: BoxStream<'static, ContextUpdate>,
	cache: Arc<ContextCache>,
	tracker: Arc<dyn ErrorTracker>,
) {
	while let Some(update) = updates.next().await {
		if let ContextUpdate::User(user) = &update {
			debug!(has_user = user.is_some(), "User context updated");
			tracker.set_user(user.as_ref().map(to_sentry_user));
		} else {
			debug!("Application context updated");
		}
		cache.apply(update);
	}
	debug!("Context update stream ended");
}
