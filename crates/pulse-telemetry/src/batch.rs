// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The in-memory event queue and batching policy.

use std::collections::VecDeque;
use std::time::Duration;

use pulse_telemetry_core::TelemetryEvent;
use tokio::sync::Mutex;
use tracing::warn;

/// Configuration for the event queue and flush cadence.
#[derive(Debug, Clone)]
pub struct BatchConfig {
	/// Events per batch; reaching this queue length triggers a flush.
	pub batch_size: usize,
	/// Interval between automatic flushes. Zero disables the timer.
	pub flush_interval: Duration,
	/// Maximum number of events to queue before dropping oldest.
	pub max_queue_size: usize,
}

impl Default for BatchConfig {
	fn default() -> Self {
		Self {
			batch_size: 10,
			flush_interval: Duration::from_secs(10),
			max_queue_size: 1000,
		}
	}
}

/// FIFO queue of pending events.
///
/// Events are held in arrival order. A drained batch is always a contiguous
/// prefix of the queue, and drains are atomic with respect to concurrent
/// pushes: no event is ever returned by two drains.
pub struct EventQueue {
	inner: Mutex<VecDeque<TelemetryEvent>>,
	max_queue_size: usize,
}

impl EventQueue {
	pub fn new(max_queue_size: usize) -> Self {
		Self {
			inner: Mutex::new(VecDeque::new()),
			max_queue_size,
		}
	}

	/// Appends an event at the tail, returning the resulting queue length.
	///
	/// If the queue is at capacity the oldest events are dropped first.
	pub async fn push(&self, event: TelemetryEvent) -> usize {
		let mut queue = self.inner.lock().await;

		while queue.len() >= self.max_queue_size {
			if let Some(dropped) = queue.pop_front() {
				warn!(
					event_name = %dropped.name,
					session_id = %dropped.session_id,
					"dropped event due to queue overflow"
				);
			}
		}

		queue.push_back(event);
		queue.len()
	}

	/// Atomically removes and returns up to `max` events from the head.
	pub async fn drain(&self, max: usize) -> Vec<TelemetryEvent> {
		let mut queue = self.inner.lock().await;
		let take = max.min(queue.len());
		queue.drain(..take).collect()
	}

	/// Re-inserts a failed batch at the head, preserving its order.
	///
	/// Requeued events are exempt from the capacity cap: dropping them here
	/// would silently lose events the pipeline still owes the collector.
	pub async fn requeue_front(&self, batch: Vec<TelemetryEvent>) {
		let mut queue = self.inner.lock().await;
		for event in batch.into_iter().rev() {
			queue.push_front(event);
		}
	}

	pub async fn len(&self) -> usize {
		self.inner.lock().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.inner.lock().await.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	fn event(name: &str) -> TelemetryEvent {
		TelemetryEvent::new(name, "session_test", None)
	}

	fn names(events: &[TelemetryEvent]) -> Vec<&str> {
		events.iter().map(|e| e.name.as_str()).collect()
	}

	#[tokio::test]
	async fn drain_returns_contiguous_prefix_in_order() {
		let queue = EventQueue::new(100);
		for name in ["a", "b", "c", "d"] {
			queue.push(event(name)).await;
		}

		let batch = queue.drain(3).await;
		assert_eq!(names(&batch), vec!["a", "b", "c"]);
		assert_eq!(queue.len().await, 1);

		let rest = queue.drain(3).await;
		assert_eq!(names(&rest), vec!["d"]);
		assert!(queue.is_empty().await);
	}

	#[tokio::test]
	async fn drain_of_empty_queue_is_empty() {
		let queue = EventQueue::new(100);
		assert!(queue.drain(10).await.is_empty());
	}

	#[tokio::test]
	async fn push_reports_length_for_flush_trigger() {
		let queue = EventQueue::new(100);
		assert_eq!(queue.push(event("a")).await, 1);
		assert_eq!(queue.push(event("b")).await, 2);
	}

	#[tokio::test]
	async fn overflow_drops_oldest() {
		let queue = EventQueue::new(3);
		for i in 0..5 {
			queue.push(event(&format!("event{i}"))).await;
		}

		let batch = queue.drain(10).await;
		assert_eq!(names(&batch), vec!["event2", "event3", "event4"]);
	}

	#[tokio::test]
	async fn requeue_front_preserves_batch_order() {
		let queue = EventQueue::new(100);
		queue.push(event("c")).await;
		queue.push(event("d")).await;

		queue.requeue_front(vec![event("a"), event("b")]).await;

		let batch = queue.drain(10).await;
		assert_eq!(names(&batch), vec!["a", "b", "c", "d"]);
	}

	#[tokio::test]
	async fn concurrent_drains_never_duplicate_events() {
		let queue = Arc::new(EventQueue::new(1000));
		for i in 0..100 {
			queue.push(event(&format!("event{i:03}"))).await;
		}

		let q1 = Arc::clone(&queue);
		let q2 = Arc::clone(&queue);
		let (batch1, batch2) = tokio::join!(
			tokio::spawn(async move { q1.drain(50).await }),
			tokio::spawn(async move { q2.drain(50).await }),
		);
		let batch1 = batch1.unwrap();
		let batch2 = batch2.unwrap();

		let mut seen: Vec<String> = batch1
			.iter()
			.chain(batch2.iter())
			.map(|e| e.name.clone())
			.collect();
		seen.sort();
		seen.dedup();
		assert_eq!(seen.len(), 100, "every event drained exactly once");
		assert!(queue.is_empty().await);
	}
}
