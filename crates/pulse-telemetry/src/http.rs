// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP transport: delivers batches to the collector endpoint and spools
//! undeliverable batches to disk.

use std::path::PathBuf;
use std::time::Duration;

use pulse_common_http::RetryConfig;
use pulse_telemetry_core::TelemetryEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TelemetryError};
use crate::spool::FailureSpool;
use crate::transport::Sender;

/// Placeholder collector URL; deployments configure their own.
pub const DEFAULT_ENDPOINT: &str = "https://your.telemetry.endpoint/collect";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Wire envelope for a delivered batch: `{ "events": [...] }`.
#[derive(Debug, Serialize, Deserialize)]
struct EventsPayload {
	events: Vec<TelemetryEvent>,
}

/// Transport that POSTs batches as JSON to a collector endpoint.
///
/// When a spool is configured (the default), batches that exhaust their
/// retry budget are persisted to disk and replayed on the next startup.
pub struct HttpSender {
	client: reqwest::Client,
	endpoint: String,
	spool: Option<FailureSpool>,
	retry: RetryConfig,
}

impl HttpSender {
	/// Creates a sender for the given collector endpoint with the default
	/// client, retry configuration, and spool location.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			client: pulse_common_http::new_client_with_timeout(DEFAULT_REQUEST_TIMEOUT),
			endpoint: endpoint.into(),
			spool: FailureSpool::default_path().map(FailureSpool::new),
			retry: RetryConfig::default(),
		}
	}

	/// Replaces the HTTP client (builder pattern).
	pub fn with_client(mut self, client: reqwest::Client) -> Self {
		self.client = client;
		self
	}

	/// Spools undeliverable batches to the given path (builder pattern).
	pub fn with_spool_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.spool = Some(FailureSpool::new(path));
		self
	}

	/// Disables failure persistence entirely (builder pattern).
	pub fn without_spool(mut self) -> Self {
		self.spool = None;
		self
	}

	/// Sets the retry configuration used during replay (builder pattern).
	pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
		self.retry = retry;
		self
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}
}

impl Default for HttpSender {
	fn default() -> Self {
		Self::new(DEFAULT_ENDPOINT)
	}
}

#[async_trait::async_trait]
impl Sender for HttpSender {
	async fn send(&self, events: Vec<TelemetryEvent>) -> Result<()> {
		let count = events.len();
		debug!(endpoint = %self.endpoint, count, "sending telemetry batch");

		let response = self
			.client
			.post(&self.endpoint)
			.json(&EventsPayload { events })
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(TelemetryError::ServerError {
				status: response.status().as_u16(),
				message: response.text().await.unwrap_or_default(),
			});
		}

		Ok(())
	}

	fn can_persist(&self) -> bool {
		self.spool.is_some()
	}

	async fn persist_failed(&self, events: Vec<TelemetryEvent>) -> Result<()> {
		let Some(spool) = &self.spool else {
			return Err(TelemetryError::PersistenceUnsupported);
		};

		warn!(
			count = events.len(),
			path = %spool.path().display(),
			"persisting undeliverable telemetry batch"
		);
		spool.append(events).await?;
		Ok(())
	}

	async fn replay_failed(&self) -> Result<()> {
		let Some(spool) = &self.spool else {
			return Ok(());
		};

		// Clear the store up front so a replayed event can never be
		// duplicated by a concurrent persist cycle.
		let events = spool.take().await?;
		if events.is_empty() {
			return Ok(());
		}

		info!(count = events.len(), "replaying previously persisted telemetry events");

		let result = pulse_common_http::retry(&self.retry, || {
			let events = events.clone();
			async move { self.send(events).await }
		})
		.await;

		if let Err(err) = result {
			// Renewed failure: the events go back to the spool, once.
			spool.append(events).await?;
			return Err(err);
		}

		Ok(())
	}
}
