// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for the Pulse client-side telemetry pipeline.
//!
//! This crate provides the shared data model for telemetry: events, sessions,
//! and identifier generation. It is pure (no I/O, no async runtime) and is
//! consumed by the SDK crate (`pulse-telemetry`).
//!
//! # Overview
//!
//! - [`TelemetryEvent`] — an immutable named event with an arbitrary payload,
//!   stamped with the session and user identity active at creation time
//! - [`Session`] — the per-client session record, replaced wholesale on
//!   rotation
//! - [`generate_session_id`] / [`generate_user_id`] — identifier composition
//!   over an injectable [`RandomSource`], so tests can supply deterministic
//!   identities
//!
//! # Example
//!
//! ```
//! use pulse_telemetry_core::{DefaultRandomSource, Session, TelemetryEvent};
//! use pulse_telemetry_core::generate_session_id;
//!
//! let session_id = generate_session_id(&DefaultRandomSource);
//! let mut session = Session::new(session_id.clone());
//! session.visit("home");
//!
//! let event = TelemetryEvent::new("button_clicked", session_id, None)
//!     .with_data(serde_json::json!({"button_name": "checkout"}));
//! assert_eq!(event.name, "button_clicked");
//! assert!(session.has_visited("home"));
//! ```

pub mod event;
pub mod identity;
pub mod session;

pub use event::TelemetryEvent;
pub use identity::{
	generate_session_id, generate_user_id, DefaultRandomSource, RandomSource, SESSION_ID_PREFIX,
	USER_ID_PREFIX,
};
pub use session::Session;
