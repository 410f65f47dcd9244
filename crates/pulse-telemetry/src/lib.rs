// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rust SDK for the Pulse client-side telemetry pipeline.
//!
//! Applications log named events with arbitrary payloads; the pipeline
//! stamps them with session/user identity, batches them, and delivers them
//! to a remote collector, tolerating transient network failure without
//! losing data and without blocking the caller.
//!
//! # Quick Start
//!
//! ```ignore
//! use pulse_telemetry::{Properties, TelemetryClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::builder()
//!         .endpoint("https://collector.example.com/collect")
//!         .flush_interval(Duration::from_secs(10))
//!         .build();
//!
//!     client.log("checkout_completed", Properties::new()
//!         .insert("total", 99.99)
//!         .insert("items", 3)
//!     ).await?;
//!
//!     client.record_metric("frame_drops", 7, Properties::new()
//!         .insert("screen.name", "home")
//!     ).await?;
//!
//!     // Shutdown gracefully (flushes pending events)
//!     client.shutdown().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Delivery Pipeline
//!
//! Events are queued locally and flushed in batches — when the queue
//! reaches the batch size, or on a fixed interval. A batch that fails is
//! retried with exponential backoff; a batch that exhausts its retry budget
//! is persisted to the transport's failure spool (or re-enqueued) so no
//! event is silently dropped. Spooled batches are replayed once at the next
//! startup.
//!
//! Guarantees are at-least-once: an event is delivered, or waiting in the
//! queue, or sitting in the spool — never lost, possibly duplicated across
//! a crash. Deduplication, if needed, is left to the collector.
//!
//! # Custom Transports
//!
//! The delivery mechanism is the [`Sender`] trait. The default is
//! [`HttpSender`], which POSTs `{ "events": [...] }` as JSON and spools
//! failures to disk; applications can supply their own:
//!
//! ```ignore
//! let client = TelemetryClient::builder()
//!     .sender(Arc::new(MySender::new()))
//!     .build();
//! ```
//!
//! # Error Handling
//!
//! `log` never fails for delivery reasons. Delivery errors surface only
//! through caller-awaited [`TelemetryClient::flush`] and
//! [`TelemetryClient::shutdown`]; the background timer and the startup
//! replay log their failures and carry on.

pub mod batch;
pub mod client;
pub mod engine;
pub mod error;
pub mod http;
pub mod properties;
pub mod screen;
pub mod spool;
pub mod transport;

pub use batch::BatchConfig;
pub use client::{TelemetryClient, TelemetryClientBuilder};
pub use error::{Result, TelemetryError};
pub use http::{HttpSender, DEFAULT_ENDPOINT};
pub use properties::Properties;
pub use screen::ScreenTimingTracker;
pub use spool::FailureSpool;
pub use transport::Sender;

// Re-export types from pulse-telemetry-core that users may need
pub use pulse_telemetry_core::{
	DefaultRandomSource, RandomSource, Session, TelemetryEvent,
};

// Re-export the retry configuration consumed by the builder
pub use pulse_common_http::RetryConfig;
