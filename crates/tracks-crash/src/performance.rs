// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Transaction registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;
use tracks_crash_core::{TransactionId, TransactionOperation, TransactionStatus};

use crate::tracker::{PerformanceMonitor, TransactionSpan};

/// Open transactions, keyed by the id handed back to the caller.
///
/// Entries are removed when finished, so the map only ever holds transactions
/// that are still running.
pub struct TransactionRegistry {
	monitor: Arc<dyn PerformanceMonitor>,
	bind_to_scope: bool,
	transactions: Mutex<HashMap<TransactionId, Box<dyn TransactionSpan>>>,
}

impl TransactionRegistry {
	pub fn new(monitor: Arc<dyn PerformanceMonitor>, bind_to_scope: bool) -> Self {
		Self {
			monitor,
			bind_to_scope,
			transactions: Mutex::new(HashMap::new()),
		}
	}

	pub fn start_transaction(&self, name: &str, operation: TransactionOperation) -> TransactionId {
		let span = self
			.monitor
			.start_transaction(name, operation, self.bind_to_scope);
		let id = TransactionId::new();
		self.transactions.lock().insert(id, span);
		debug!(%id, transaction = name, %operation, "Transaction started");
		id
	}

	/// Finishes and forgets a transaction. Unknown ids are ignored.
	pub fn finish_transaction(&self, id: TransactionId, status: TransactionStatus) {
		let span = self.transactions.lock().remove(&id);
		match span {
			Some(span) => {
				span.finish(status);
				debug!(%id, %status, "Transaction finished");
			}
			None => debug!(%id, "Ignoring finish for unknown transaction"),
		}
	}

	pub fn active_transactions(&self) -> usize {
		self.transactions.lock().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::FakePerformanceMonitor;

	fn registry() -> (Arc<FakePerformanceMonitor>, TransactionRegistry) {
		let monitor = Arc::new(FakePerformanceMonitor::default());
		let registry = TransactionRegistry::new(monitor.clone(), true);
		(monitor, registry)
	}

	#[test]
	fn test_start_then_finish() {
		let (monitor, registry) = registry();

		let id = registry.start_transaction("load", TransactionOperation::UiLoad);
		assert_eq!(registry.active_transactions(), 1);
		assert_eq!(
			monitor.started(),
			vec![("load".to_string(), TransactionOperation::UiLoad, true)]
		);

		registry.finish_transaction(id, TransactionStatus::Successful);

		assert_eq!(registry.active_transactions(), 0);
		assert_eq!(
			monitor.finished(),
			vec![("load".to_string(), TransactionStatus::Successful)]
		);
	}

	#[test]
	fn test_second_finish_is_noop() {
		let (monitor, registry) = registry();

		let id = registry.start_transaction("load", TransactionOperation::UiLoad);
		registry.finish_transaction(id, TransactionStatus::Successful);
		registry.finish_transaction(id, TransactionStatus::Aborted);

		assert_eq!(monitor.finished().len(), 1);
		assert_eq!(monitor.finished()[0].1, TransactionStatus::Successful);
	}

	#[test]
	fn test_unknown_id_is_ignored() {
		let (monitor, registry) = registry();
		let _open = registry.start_transaction("open", TransactionOperation::DbQuery);

		registry.finish_transaction(TransactionId::new(), TransactionStatus::Aborted);

		assert!(monitor.finished().is_empty());
		assert_eq!(registry.active_transactions(), 1);
	}

	#[test]
	fn test_finishing_one_leaves_others_open() {
		let (monitor, registry) = registry();

		let first = registry.start_transaction("first", TransactionOperation::UiAction);
		let _second = registry.start_transaction("second", TransactionOperation::HttpClient);
		registry.finish_transaction(first, TransactionStatus::Aborted);

		assert_eq!(registry.active_transactions(), 1);
		assert_eq!(
			monitor.finished(),
			vec![("first".to_string(), TransactionStatus::Aborted)]
		);
	}

	#[test]
	fn test_scope_binding_is_forwarded() {
		let monitor = Arc::new(FakePerformanceMonitor::default());
		let registry = TransactionRegistry::new(monitor.clone(), false);

		registry.start_transaction("unbound", TransactionOperation::UiLoad);

		assert!(!monitor.started()[0].2);
	}

	#[test]
	fn test_concurrent_starts_yield_distinct_ids() {
		let (monitor, registry) = registry();
		let registry = Arc::new(registry);

		let handles: Vec<_> = (0..8)
			.map(|thread| {
				let registry = Arc::clone(&registry);
				std::thread::spawn(move || {
					(0..25)
						.map(|i| {
							registry.start_transaction(
								&format!("tx-{thread}-{i}"),
								TransactionOperation::UiAction,
							)
						})
						.collect::<Vec<_>>()
				})
			})
			.collect();

		let mut ids: Vec<TransactionId> = handles
			.into_iter()
			.flat_map(|handle| handle.join().unwrap())
			.collect();
		assert_eq!(registry.active_transactions(), 200);

		for id in &ids {
			registry.finish_transaction(*id, TransactionStatus::Successful);
		}
		assert_eq!(registry.active_transactions(), 0);
		assert_eq!(monitor.finished().len(), 200);

		ids.sort_by_key(|id| id.0);
		ids.dedup();
		assert_eq!(ids.len(), 200);
	}
}
