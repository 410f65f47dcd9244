// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The telemetry event type.
//!
//! Events are immutable once created: the timestamp and the session/user
//! identity are fixed at the moment the event is constructed and are never
//! retroactively altered, even if the client's identity changes later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single named telemetry event.
///
/// On the wire an event serializes as
/// `{ "name": ..., "data": ..., "timestamp": <integer ms>, "userId": ...,
/// "sessionId": ... }`, with `data` omitted when the event carries no
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryEvent {
	/// Event name, e.g. `screen_view` or `checkout_completed`.
	pub name: String,
	/// Arbitrary event payload. `Null` means no payload.
	#[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
	pub data: serde_json::Value,
	/// Creation time, serialized as integer milliseconds since the epoch.
	#[serde(with = "chrono::serde::ts_milliseconds")]
	pub timestamp: DateTime<Utc>,
	/// User identity active when the event was created, if any.
	pub user_id: Option<String>,
	/// Session identity active when the event was created.
	pub session_id: String,
}

impl TelemetryEvent {
	/// Creates an event stamped with the current clock and the given identity.
	pub fn new(
		name: impl Into<String>,
		session_id: impl Into<String>,
		user_id: Option<String>,
	) -> Self {
		Self {
			name: name.into(),
			data: serde_json::Value::Null,
			timestamp: Utc::now(),
			user_id,
			session_id: session_id.into(),
		}
	}

	/// Sets the event payload (builder pattern).
	pub fn with_data(mut self, data: serde_json::Value) -> Self {
		self.data = data;
		self
	}

	/// Overrides the event timestamp (builder pattern).
	pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
		self.timestamp = timestamp;
		self
	}
}
