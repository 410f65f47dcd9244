// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The flush/retry engine and its background worker.
//!
//! A flush drains one batch from the queue and drives delivery attempts
//! through the transport with exponential backoff. A batch that exhausts its
//! retry budget is handed to the transport's persistence capability, or
//! re-enqueued at the head of the queue when that capability is absent or
//! failing, so no event is ever silently dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pulse_common_http::RetryConfig;
use pulse_telemetry_core::TelemetryEvent;
use tokio::sync::{Mutex, Notify};
use tracing::{debug, error, info, warn};

use crate::batch::{BatchConfig, EventQueue};
use crate::error::Result;
use crate::transport::Sender;

/// Drains batches from the queue and delivers them through the transport.
pub struct FlushEngine {
	sender: Option<Arc<dyn Sender>>,
	queue: Arc<EventQueue>,
	config: BatchConfig,
	retry: RetryConfig,
	// Serializes flushes: a backoff wait must not let a second flush drain
	// the queue and deliver ahead of the in-flight batch.
	flush_lock: Mutex<()>,
	flush_notify: Notify,
	shutdown: AtomicBool,
}

impl FlushEngine {
	pub fn new(
		sender: Option<Arc<dyn Sender>>,
		queue: Arc<EventQueue>,
		config: BatchConfig,
		retry: RetryConfig,
	) -> Self {
		Self {
			sender,
			queue,
			config,
			retry,
			flush_lock: Mutex::new(()),
			flush_notify: Notify::new(),
			shutdown: AtomicBool::new(false),
		}
	}

	/// Drains one batch and delivers it, retrying with backoff.
	///
	/// No-op when no transport is configured or the queue is empty. On
	/// success the batch is delivered and discarded. When the retry budget
	/// is exhausted the batch is persisted (or re-enqueued at the head) and
	/// the final delivery error is propagated to the caller.
	pub async fn flush(&self) -> Result<()> {
		let Some(sender) = &self.sender else {
			return Ok(());
		};

		let _guard = self.flush_lock.lock().await;

		let batch = self.queue.drain(self.config.batch_size).await;
		if batch.is_empty() {
			return Ok(());
		}

		debug!(count = batch.len(), "flushing telemetry batch");

		// The same batch is re-sent on every attempt; events enqueued during
		// a backoff wait stay queued for the next flush.
		let result = pulse_common_http::retry(&self.retry, || {
			let events = batch.clone();
			async move { sender.send(events).await }
		})
		.await;

		match result {
			Ok(()) => Ok(()),
			Err(err) => {
				error!(
					error = %err,
					count = batch.len(),
					"telemetry batch exhausted its retry budget"
				);
				self.stash_failed_batch(sender, batch).await;
				Err(err)
			}
		}
	}

	/// Hands a failed batch to the transport's persistence capability, or
	/// re-enqueues it at the head of the queue.
	async fn stash_failed_batch(&self, sender: &Arc<dyn Sender>, batch: Vec<TelemetryEvent>) {
		if sender.can_persist() {
			match sender.persist_failed(batch.clone()).await {
				Ok(()) => return,
				Err(persist_err) => {
					error!(
						error = %persist_err,
						"failed to persist undeliverable batch, re-enqueueing"
					);
				}
			}
		}
		self.queue.requeue_front(batch).await;
	}

	/// Wakes the background worker for a fire-and-forget flush.
	pub fn notify_flush(&self) {
		self.flush_notify.notify_one();
	}

	/// Signals the background worker to exit.
	pub fn shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.flush_notify.notify_one();
	}

	pub fn is_shutdown(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	/// Runs the background flush loop.
	///
	/// Flushes on the configured interval (skipped when zero) and whenever
	/// [`FlushEngine::notify_flush`] fires. Flush errors are logged and
	/// swallowed so one bad flush never stops the timer.
	pub async fn run(&self) {
		info!(
			batch_size = self.config.batch_size,
			flush_interval_ms = self.config.flush_interval.as_millis() as u64,
			"starting telemetry flush worker"
		);

		loop {
			if self.config.flush_interval.is_zero() {
				self.flush_notify.notified().await;
			} else {
				tokio::select! {
					_ = tokio::time::sleep(self.config.flush_interval) => {}
					_ = self.flush_notify.notified() => {}
				}
			}

			if self.shutdown.load(Ordering::SeqCst) {
				break;
			}

			if let Err(err) = self.flush().await {
				error!(error = %err, "background telemetry flush failed");
			}
		}

		info!("telemetry flush worker stopped");
	}

	/// Fires the one-shot startup replay of previously persisted batches.
	///
	/// Best-effort: runs detached so construction never blocks on it, and
	/// failures are logged rather than propagated.
	pub fn spawn_replay(&self) {
		let Some(sender) = self.sender.clone() else {
			return;
		};
		tokio::spawn(async move {
			if let Err(err) = sender.replay_failed().await {
				warn!(error = %err, "telemetry replay failed");
			}
		});
	}
}
