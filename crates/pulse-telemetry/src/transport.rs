// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The pluggable transport (Sender capability) consumed by the pipeline.

use pulse_telemetry_core::TelemetryEvent;

use crate::error::{Result, TelemetryError};

/// A delivery mechanism for telemetry batches.
///
/// One `send` call is exactly one delivery attempt for one batch; retries
/// and backoff are driven by the flush engine, not by the transport. The
/// persistence and replay capabilities are optional extension points with
/// default behavior, so simple transports only implement `send`.
#[async_trait::async_trait]
pub trait Sender: Send + Sync {
	/// Attempts to deliver one batch of events.
	async fn send(&self, events: Vec<TelemetryEvent>) -> Result<()>;

	/// Whether this transport can persist undeliverable batches.
	///
	/// When false, the engine re-enqueues a batch that exhausted its retry
	/// budget instead of calling [`Sender::persist_failed`].
	fn can_persist(&self) -> bool {
		false
	}

	/// Persists a batch that exhausted its retry budget.
	async fn persist_failed(&self, _events: Vec<TelemetryEvent>) -> Result<()> {
		Err(TelemetryError::PersistenceUnsupported)
	}

	/// Resends previously persisted batches.
	///
	/// Invoked once at client construction. Implementations must be
	/// idempotent (replaying an empty store is a no-op) and must apply the
	/// same retry/backoff/persist contract as a live flush.
	async fn replay_failed(&self) -> Result<()> {
		Ok(())
	}
}
