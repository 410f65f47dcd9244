// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Screen-duration instrumentation layered over the client.
//!
//! The client itself records `screen_view`/`screen_end` events but does not
//! measure how long a screen stayed visible; this collaborator does, logging
//! a `performance.screen_duration` event when a screen ends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::client::TelemetryClient;
use crate::error::Result;
use crate::properties::Properties;

/// Tracks per-screen visibility windows and logs their durations.
pub struct ScreenTimingTracker {
	client: Arc<TelemetryClient>,
	start_times: Mutex<HashMap<String, Instant>>,
}

impl ScreenTimingTracker {
	pub fn new(client: Arc<TelemetryClient>) -> Self {
		Self {
			client,
			start_times: Mutex::new(HashMap::new()),
		}
	}

	/// Marks the screen as started and logs its `screen_view` event.
	pub async fn start_screen(&self, screen: &str) -> Result<()> {
		self.start_times
			.lock()
			.await
			.insert(screen.to_string(), Instant::now());
		self.client.start_screen(screen).await
	}

	/// Logs the screen's `screen_end` event and its measured duration.
	///
	/// An `end_screen` with no matching start is ignored.
	pub async fn end_screen(&self, screen: &str) -> Result<()> {
		let Some(started) = self.start_times.lock().await.remove(screen) else {
			return Ok(());
		};

		self.client.end_screen(screen).await?;

		let duration_ms = started.elapsed().as_millis() as u64;
		self.client
			.log(
				"performance.screen_duration",
				Properties::new()
					.insert("screen.name", screen)
					.insert("duration_ms", duration_ms),
			)
			.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	use pulse_common_http::RetryConfig;
	use pulse_telemetry_core::TelemetryEvent;

	use crate::transport::Sender;

	struct RecordingSender {
		batches: Mutex<Vec<Vec<TelemetryEvent>>>,
	}

	impl RecordingSender {
		fn new() -> Self {
			Self {
				batches: Mutex::new(Vec::new()),
			}
		}

		async fn events(&self) -> Vec<TelemetryEvent> {
			self.batches.lock().await.clone().into_iter().flatten().collect()
		}
	}

	#[async_trait::async_trait]
	impl Sender for RecordingSender {
		async fn send(&self, events: Vec<TelemetryEvent>) -> Result<()> {
			self.batches.lock().await.push(events);
			Ok(())
		}
	}

	fn tracked_client(sender: Arc<RecordingSender>) -> Arc<TelemetryClient> {
		Arc::new(
			TelemetryClient::builder()
				.sender(sender as Arc<dyn Sender>)
				.flush_interval(Duration::ZERO)
				.retry_config(RetryConfig {
					max_attempts: 1,
					base_delay: Duration::from_millis(1),
					max_delay: Duration::from_millis(10),
					jitter: Duration::ZERO,
				})
				.build(),
		)
	}

	#[tokio::test]
	async fn end_screen_logs_the_measured_duration() {
		let sender = Arc::new(RecordingSender::new());
		let client = tracked_client(Arc::clone(&sender));
		let tracker = ScreenTimingTracker::new(Arc::clone(&client));

		tracker.start_screen("home").await.unwrap();
		tokio::time::sleep(Duration::from_millis(20)).await;
		tracker.end_screen("home").await.unwrap();

		client.flush().await.unwrap();

		let events = sender.events().await;
		let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
		assert_eq!(names, vec!["screen_view", "screen_end", "performance.screen_duration"]);

		let duration = &events[2];
		assert_eq!(duration.data["screen.name"], "home");
		assert!(duration.data["duration_ms"].as_u64().unwrap() >= 20);

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn unmatched_end_screen_is_ignored() {
		let sender = Arc::new(RecordingSender::new());
		let client = tracked_client(Arc::clone(&sender));
		let tracker = ScreenTimingTracker::new(Arc::clone(&client));

		tracker.end_screen("never_started").await.unwrap();

		client.flush().await.unwrap();
		assert!(sender.events().await.is_empty());

		client.shutdown().await.unwrap();
	}

	#[tokio::test]
	async fn each_screen_is_timed_independently() {
		let sender = Arc::new(RecordingSender::new());
		let client = tracked_client(Arc::clone(&sender));
		let tracker = ScreenTimingTracker::new(Arc::clone(&client));

		tracker.start_screen("home").await.unwrap();
		tracker.start_screen("settings").await.unwrap();
		tracker.end_screen("settings").await.unwrap();
		tracker.end_screen("home").await.unwrap();

		client.flush().await.unwrap();

		let durations: Vec<String> = sender
			.events()
			.await
			.into_iter()
			.filter(|e| e.name == "performance.screen_duration")
			.map(|e| e.data["screen.name"].as_str().unwrap().to_string())
			.collect();
		assert_eq!(durations, vec!["settings", "home"]);

		client.shutdown().await.unwrap();
	}
}
