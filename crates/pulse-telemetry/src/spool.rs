// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! File-backed store for undeliverable events.
//!
//! The spool is a single JSON file holding a flat array of events. Failed
//! batches are appended with a read-modify-write cycle; replay reads and
//! clears the file before resending, so replayed events are never
//! duplicated.

use std::path::{Path, PathBuf};

use pulse_telemetry_core::TelemetryEvent;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SpoolError {
	#[error("failed to access spool file: {0}")]
	Io(#[from] std::io::Error),

	#[error("invalid spool contents: {0}")]
	Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpoolError>;

/// Persistent store for events that exhausted their delivery retries.
pub struct FailureSpool {
	path: PathBuf,
	// Serializes read-modify-write cycles so two persists cannot clobber
	// each other's appends.
	lock: Mutex<()>,
}

impl FailureSpool {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			lock: Mutex::new(()),
		}
	}

	/// The default spool location under the user data directory.
	pub fn default_path() -> Option<PathBuf> {
		dirs::data_dir().map(|p| p.join("pulse").join("telemetry_failed_events.json"))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Appends events to the store: read existing, extend, write back.
	pub async fn append(&self, events: Vec<TelemetryEvent>) -> Result<()> {
		let _guard = self.lock.lock().await;
		let mut stored = self.read_unlocked().await?;
		stored.extend(events);
		self.write_unlocked(&stored).await
	}

	/// Removes and returns all stored events.
	///
	/// A missing or empty store yields an empty vec and leaves no file
	/// behind.
	pub async fn take(&self) -> Result<Vec<TelemetryEvent>> {
		let _guard = self.lock.lock().await;
		let stored = self.read_unlocked().await?;
		if !stored.is_empty() {
			fs::remove_file(&self.path).await?;
		}
		Ok(stored)
	}

	/// Number of events currently stored.
	pub async fn len(&self) -> Result<usize> {
		let _guard = self.lock.lock().await;
		Ok(self.read_unlocked().await?.len())
	}

	pub async fn is_empty(&self) -> Result<bool> {
		Ok(self.len().await? == 0)
	}

	async fn read_unlocked(&self) -> Result<Vec<TelemetryEvent>> {
		match fs::read_to_string(&self.path).await {
			Ok(contents) => Ok(serde_json::from_str(&contents)?),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
			Err(err) => Err(err.into()),
		}
	}

	async fn write_unlocked(&self, events: &[TelemetryEvent]) -> Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}
		let contents = serde_json::to_vec(events)?;
		fs::write(&self.path, contents).await?;
		Ok(())
	}
}
