// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The telemetry client: the single integration point applications call.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pulse_common_http::RetryConfig;
use pulse_telemetry_core::{
	generate_session_id, generate_user_id, DefaultRandomSource, RandomSource, Session,
	TelemetryEvent,
};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::batch::{BatchConfig, EventQueue};
use crate::engine::FlushEngine;
use crate::error::{Result, TelemetryError};
use crate::http::{HttpSender, DEFAULT_ENDPOINT};
use crate::properties::Properties;
use crate::transport::Sender;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builder for constructing a [`TelemetryClient`].
///
/// Every option has a default; `build()` cannot fail.
pub struct TelemetryClientBuilder {
	sender: Option<Arc<dyn Sender>>,
	transport_disabled: bool,
	endpoint: String,
	batch_config: BatchConfig,
	retry_config: RetryConfig,
	request_timeout: Duration,
	session_id: Option<String>,
	user_id: Option<String>,
	random: Option<Arc<dyn RandomSource>>,
	spool_path: Option<PathBuf>,
}

impl TelemetryClientBuilder {
	pub fn new() -> Self {
		Self {
			sender: None,
			transport_disabled: false,
			endpoint: DEFAULT_ENDPOINT.to_string(),
			batch_config: BatchConfig::default(),
			retry_config: RetryConfig::default(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			session_id: None,
			user_id: None,
			random: None,
			spool_path: None,
		}
	}

	/// Supplies a custom transport instead of the default HTTP sender.
	pub fn sender(mut self, sender: Arc<dyn Sender>) -> Self {
		self.sender = Some(sender);
		self
	}

	/// Disables delivery entirely; flushes become no-ops.
	pub fn without_transport(mut self) -> Self {
		self.transport_disabled = true;
		self
	}

	/// Sets the collector URL used by the default HTTP sender.
	pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.endpoint = endpoint.into();
		self
	}

	/// Sets the number of events per delivery batch.
	pub fn batch_size(mut self, size: usize) -> Self {
		self.batch_config.batch_size = size;
		self
	}

	/// Sets the automatic flush interval. Zero disables the timer.
	pub fn flush_interval(mut self, interval: Duration) -> Self {
		self.batch_config.flush_interval = interval;
		self
	}

	/// Sets the maximum queue length before oldest events are dropped.
	pub fn max_queue_size(mut self, size: usize) -> Self {
		self.batch_config.max_queue_size = size;
		self
	}

	/// Sets the number of delivery attempts per batch.
	pub fn retry_count(mut self, count: u32) -> Self {
		self.retry_config.max_attempts = count;
		self
	}

	/// Replaces the whole retry/backoff configuration.
	pub fn retry_config(mut self, config: RetryConfig) -> Self {
		self.retry_config = config;
		self
	}

	/// Sets the HTTP request timeout of the default sender.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	/// Overrides the generated session identifier.
	pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
		self.session_id = Some(session_id.into());
		self
	}

	/// Overrides the generated user identifier.
	pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
		self.user_id = Some(user_id.into());
		self
	}

	/// Supplies the entropy source for identifier generation.
	pub fn random_source(mut self, random: Arc<dyn RandomSource>) -> Self {
		self.random = Some(random);
		self
	}

	/// Sets the spool location of the default HTTP sender.
	pub fn spool_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.spool_path = Some(path.into());
		self
	}

	/// Builds the client, spawns the background flush worker, and fires the
	/// one-shot replay of previously persisted batches.
	///
	/// Must be called within a tokio runtime.
	pub fn build(self) -> TelemetryClient {
		let random: Arc<dyn RandomSource> = self
			.random
			.unwrap_or_else(|| Arc::new(DefaultRandomSource));

		let session_id = self
			.session_id
			.unwrap_or_else(|| generate_session_id(random.as_ref()));
		let user_id = self
			.user_id
			.unwrap_or_else(|| generate_user_id(random.as_ref()));

		let sender: Option<Arc<dyn Sender>> = if self.transport_disabled {
			None
		} else if let Some(sender) = self.sender {
			Some(sender)
		} else {
			let mut http = HttpSender::new(self.endpoint)
				.with_client(pulse_common_http::new_client_with_timeout(
					self.request_timeout,
				))
				.with_retry_config(self.retry_config.clone());
			if let Some(path) = self.spool_path {
				http = http.with_spool_path(path);
			}
			Some(Arc::new(http))
		};

		let queue = Arc::new(EventQueue::new(self.batch_config.max_queue_size));
		let engine = Arc::new(FlushEngine::new(
			sender,
			Arc::clone(&queue),
			self.batch_config.clone(),
			self.retry_config,
		));

		engine.spawn_replay();

		let worker = {
			let engine = Arc::clone(&engine);
			tokio::spawn(async move { engine.run().await })
		};

		info!(session_id = %session_id, "telemetry client initialized");

		TelemetryClient {
			queue,
			engine,
			batch_size: self.batch_config.batch_size,
			session: RwLock::new(Session::new(session_id)),
			user_id: RwLock::new(Some(user_id)),
			random,
			event_count: AtomicU64::new(0),
			metric_count: AtomicU64::new(0),
			worker: RwLock::new(Some(worker)),
			closed: AtomicBool::new(false),
		}
	}
}

impl Default for TelemetryClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

/// Client for logging telemetry events.
///
/// Events are stamped with the current session/user identity and clock at
/// the moment [`TelemetryClient::log`] is called, queued, and delivered in
/// batches by a background worker. Delivery failures never surface through
/// `log`; they propagate only from caller-awaited [`TelemetryClient::flush`]
/// and [`TelemetryClient::shutdown`].
///
/// # Example
///
/// ```ignore
/// use pulse_telemetry::{Properties, TelemetryClient};
/// use std::time::Duration;
///
/// let client = TelemetryClient::builder()
///     .endpoint("https://collector.example.com/collect")
///     .flush_interval(Duration::from_secs(10))
///     .build();
///
/// client.log("checkout_completed", Properties::new()
///     .insert("total", 99.99)
/// ).await?;
///
/// client.shutdown().await?;
/// ```
pub struct TelemetryClient {
	queue: Arc<EventQueue>,
	engine: Arc<FlushEngine>,
	batch_size: usize,
	session: RwLock<Session>,
	user_id: RwLock<Option<String>>,
	random: Arc<dyn RandomSource>,
	event_count: AtomicU64,
	metric_count: AtomicU64,
	worker: RwLock<Option<JoinHandle<()>>>,
	closed: AtomicBool,
}

impl TelemetryClient {
	/// Creates a new builder for constructing a TelemetryClient.
	pub fn builder() -> TelemetryClientBuilder {
		TelemetryClientBuilder::new()
	}

	/// Logs a named event with the given payload.
	///
	/// The event is stamped with the identity and clock at call time and
	/// queued; reaching the batch-size threshold triggers a fire-and-forget
	/// flush. Errors only after [`TelemetryClient::shutdown`].
	pub async fn log(&self, name: &str, data: Properties) -> Result<()> {
		self.check_closed()?;

		let event = {
			let session = self.session.read().await;
			let user_id = self.user_id.read().await;
			let event = TelemetryEvent::new(name, session.session_id.clone(), user_id.clone());
			if data.is_empty() {
				event
			} else {
				event.with_data(data.into_value())
			}
		};

		self.event_count.fetch_add(1, Ordering::Relaxed);

		let queue_len = self.queue.push(event).await;
		if queue_len >= self.batch_size {
			self.engine.notify_flush();
		}

		Ok(())
	}

	/// Logs a metric event: `log` with `{ value, metric: true }` merged
	/// into the payload.
	pub async fn record_metric(
		&self,
		name: &str,
		value: impl Into<serde_json::Value>,
		data: Properties,
	) -> Result<()> {
		let data = data.merge(Properties::new().insert("value", value).insert("metric", true));
		self.metric_count.fetch_add(1, Ordering::Relaxed);
		self.log(name, data).await
	}

	/// The active session identifier.
	pub async fn session_id(&self) -> String {
		self.session.read().await.session_id.clone()
	}

	/// Replaces the session with the given identifier.
	///
	/// The replacement session starts now and has no visited screens.
	pub async fn set_session_id(&self, session_id: impl Into<String>) {
		*self.session.write().await = Session::new(session_id);
	}

	/// Rotates to a freshly generated session, returning its identifier.
	pub async fn start_new_session(&self) -> String {
		let session_id = generate_session_id(self.random.as_ref());
		*self.session.write().await = Session::new(session_id.clone());
		session_id
	}

	/// The screens visited during the active session.
	pub async fn visited_screens(&self) -> Vec<String> {
		self.session
			.read()
			.await
			.visited_screens()
			.iter()
			.cloned()
			.collect()
	}

	/// The active user identifier, if any.
	pub async fn user_id(&self) -> Option<String> {
		self.user_id.read().await.clone()
	}

	/// Sets the user identifier. Survives session rotation.
	pub async fn set_user_id(&self, user_id: impl Into<String>) {
		*self.user_id.write().await = Some(user_id.into());
	}

	/// Generates a fresh user identifier, installs it, and returns it.
	pub async fn generate_user_id(&self) -> String {
		let user_id = generate_user_id(self.random.as_ref());
		*self.user_id.write().await = Some(user_id.clone());
		user_id
	}

	/// Logs a `screen_view` event and records the screen as visited.
	pub async fn start_screen(&self, name: &str) -> Result<()> {
		self.session.write().await.visit(name);
		self.log("screen_view", Properties::new().insert("screen.name", name))
			.await
	}

	/// Logs a `screen_end` event and records the screen as visited.
	///
	/// Duration measurement is left to collaborators such as
	/// [`crate::screen::ScreenTimingTracker`].
	pub async fn end_screen(&self, name: &str) -> Result<()> {
		self.session.write().await.visit(name);
		self.log("screen_end", Properties::new().insert("screen.name", name))
			.await
	}

	/// Number of events logged over the client's lifetime.
	pub fn event_count(&self) -> u64 {
		self.event_count.load(Ordering::Relaxed)
	}

	/// Number of metric events logged over the client's lifetime.
	pub fn metric_count(&self) -> u64 {
		self.metric_count.load(Ordering::Relaxed)
	}

	/// Number of events currently queued.
	pub async fn queue_len(&self) -> usize {
		self.queue.len().await
	}

	/// Drains and delivers one batch, propagating the final delivery error
	/// after retries and persistence handling.
	pub async fn flush(&self) -> Result<()> {
		self.engine.flush().await
	}

	/// Shuts down the client: stops the background worker, then performs one
	/// final flush so buffered events are not dropped at process end.
	///
	/// Idempotent; subsequent `log` calls return `ClientShutdown`.
	pub async fn shutdown(&self) -> Result<()> {
		if self.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		info!("shutting down telemetry client");

		self.engine.shutdown();
		if let Some(worker) = self.worker.write().await.take() {
			if let Err(err) = worker.await {
				error!(error = %err, "telemetry flush worker ended abnormally");
			}
		}

		let result = self.engine.flush().await;
		info!("telemetry client shutdown complete");
		result
	}

	/// Returns true if the client has been shut down.
	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	fn check_closed(&self) -> Result<()> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(TelemetryError::ClientShutdown);
		}
		Ok(())
	}
}
