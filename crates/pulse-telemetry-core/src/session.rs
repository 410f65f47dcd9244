// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-client session record.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

/// One active telemetry session.
///
/// A session is replaced wholesale on rotation: a new session gets a fresh
/// start time and an empty visited-screens set. It is never partially
/// mutated across a rotation.
#[derive(Debug, Clone)]
pub struct Session {
	/// The session identifier stamped onto events.
	pub session_id: String,
	/// When this session began.
	pub started_at: DateTime<Utc>,
	visited_screens: HashSet<String>,
}

impl Session {
	/// Creates a new session starting now, with no visited screens.
	pub fn new(session_id: impl Into<String>) -> Self {
		Self {
			session_id: session_id.into(),
			started_at: Utc::now(),
			visited_screens: HashSet::new(),
		}
	}

	/// Records a screen name in the visited-screens set.
	pub fn visit(&mut self, screen: impl Into<String>) {
		self.visited_screens.insert(screen.into());
	}

	/// Returns true if the screen has been visited during this session.
	pub fn has_visited(&self, screen: &str) -> bool {
		self.visited_screens.contains(screen)
	}

	/// The screens visited during this session.
	pub fn visited_screens(&self) -> &HashSet<String> {
		&self.visited_screens
	}
}
