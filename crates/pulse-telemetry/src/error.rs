// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the telemetry SDK.

use pulse_common_http::RetryableError;
use thiserror::Error;

use crate::spool::SpoolError;

/// Telemetry SDK errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
	/// HTTP request failed before a response was received.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Collector returned a non-success response.
	#[error("collector error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Client has been shut down.
	#[error("client has been shut down")]
	ClientShutdown,

	/// The failure spool could not be read or written.
	#[error("failure spool error: {0}")]
	Spool(#[from] SpoolError),

	/// The transport has no failure-persistence capability.
	#[error("transport does not support failure persistence")]
	PersistenceUnsupported,
}

impl RetryableError for TelemetryError {
	// Delivery failures (network errors and non-success responses) are
	// transient and retried with backoff; local conditions are terminal.
	fn is_retryable(&self) -> bool {
		matches!(
			self,
			TelemetryError::RequestFailed(_) | TelemetryError::ServerError { .. }
		)
	}
}

/// Result type alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_server_error_is_retryable() {
		for status in [400, 429, 500, 503] {
			let err = TelemetryError::ServerError {
				status,
				message: "test".to_string(),
			};
			assert!(err.is_retryable(), "status {status} should be retryable");
		}
	}

	#[test]
	fn test_client_shutdown_not_retryable() {
		assert!(!TelemetryError::ClientShutdown.is_retryable());
	}

	#[test]
	fn test_persistence_unsupported_not_retryable() {
		assert!(!TelemetryError::PersistenceUnsupported.is_retryable());
	}

	#[test]
	fn test_spool_error_not_retryable() {
		let err = TelemetryError::Spool(SpoolError::Io(std::io::Error::new(
			std::io::ErrorKind::PermissionDenied,
			"denied",
		)));
		assert!(!err.is_retryable());
	}
}
