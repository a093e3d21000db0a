// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Crash logging SDK for Tracks applications.
//!
//! The host application implements [`CrashLoggingDataProvider`] and builds a
//! [`CrashLogging`] handle once at startup. Every event sent through the handle,
//! and every event the transport captures on its own (panics), passes through
//! the enrichment pipeline before delivery.
//!
//! # Overview
//!
//! - [`CrashLogging`]: error, message and report capture, breadcrumbs,
//!   application context and performance transactions
//! - [`EventEnricher`]: before-send pipeline (consent check, wrapper exception
//!   removal, known extras, user and application context)
//! - [`TransactionRegistry`]: open performance transactions keyed by
//!   [`TransactionId`]
//! - [`ErrorTracker`] / [`PerformanceMonitor`]: transport seams, implemented
//!   over the `sentry` crate by [`SentryErrorTracker`]
//! - [`CrashLoggingConfig`]: defaults, TOML file and `TRACKS_CRASH_*`
//!   environment overrides
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tracks_crash::{CrashLogging, CrashLoggingConfig, TransactionOperation, TransactionStatus};
//!
//! let crash_logging = CrashLogging::builder()
//!     .data_provider(Arc::new(AppDataProvider::new()))
//!     .config(CrashLoggingConfig::load(None)?)
//!     .build()?;
//!
//! let id = crash_logging.start_transaction("load feed", TransactionOperation::UiLoad);
//! // ...
//! crash_logging.finish_transaction(id, TransactionStatus::Successful);
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod performance;
pub mod pipeline;
pub mod protocol;
pub mod sentry_tracker;
pub mod tracker;

#[cfg(test)]
mod testing;

pub use client::{CrashLogging, CrashLoggingBuilder, LOCALE_TAG};
pub use config::{CrashLoggingConfig, CrashLoggingConfigLayer};
pub use context::{ContextCache, ContextSync};
pub use error::{CrashLoggingError, Result};
pub use performance::TransactionRegistry;
pub use pipeline::EventEnricher;
pub use sentry_tracker::SentryErrorTracker;
pub use tracker::{
	BeforeBreadcrumbCallback, BeforeSendCallback, ErrorTracker, PerformanceMonitor, TracesSampler,
	TrackerOptions, TransactionSpan,
};

pub use tracks_crash_core::{
	ContextSnapshot, ContextUpdate, CrashLoggingDataProvider, CrashLoggingUser, EventLevel,
	ExtraKnownKey, JsException, JsExceptionStackTraceElement, NoopPerformanceSampler,
	PerformanceMonitoringConfig, PerformanceSampler, ReleaseName, TransactionId,
	TransactionOperation, TransactionStatus,
};
