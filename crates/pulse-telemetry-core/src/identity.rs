// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session and user identifier generation.
//!
//! Identifiers compose a fixed prefix, the current timestamp in milliseconds,
//! and an 8-character slice of an injectable random-string source. The source
//! is a trait so tests can supply deterministic identities.

use chrono::Utc;

/// Prefix for generated session identifiers.
pub const SESSION_ID_PREFIX: &str = "session_";

/// Prefix for generated user identifiers.
pub const USER_ID_PREFIX: &str = "user_";

/// Length of the random slice appended to generated identifiers.
const ID_RANDOM_LENGTH: usize = 8;

/// Source of random string fragments for identifier generation.
pub trait RandomSource: Send + Sync {
	/// Returns a fresh random alphanumeric fragment.
	///
	/// Fragments should be at least 8 characters; shorter fragments are used
	/// as-is.
	fn random_fragment(&self) -> String;
}

/// Default pseudo-random source: two concatenated base-36 fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRandomSource;

impl RandomSource for DefaultRandomSource {
	fn random_fragment(&self) -> String {
		let mut fragment = base36(fastrand::u64(..));
		fragment.push_str(&base36(fastrand::u64(..)));
		fragment
	}
}

/// Generates a session identifier: `session_<millis>_<8 random chars>`.
pub fn generate_session_id(random: &dyn RandomSource) -> String {
	compose_id(SESSION_ID_PREFIX, random)
}

/// Generates a user identifier: `user_<millis>_<8 random chars>`.
pub fn generate_user_id(random: &dyn RandomSource) -> String {
	compose_id(USER_ID_PREFIX, random)
}

fn compose_id(prefix: &str, random: &dyn RandomSource) -> String {
	let entropy: String = random.random_fragment().chars().take(ID_RANDOM_LENGTH).collect();
	format!("{}{}_{}", prefix, Utc::now().timestamp_millis(), entropy)
}

fn base36(mut n: u64) -> String {
	const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
	let mut out = Vec::new();
	loop {
		out.push(DIGITS[(n % 36) as usize]);
		n /= 36;
		if n == 0 {
			break;
		}
	}
	out.reverse();
	String::from_utf8(out).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	struct FixedRandomSource(String);

	impl FixedRandomSource {
		fn new(fragment: &str) -> Self {
			Self(fragment.to_string())
		}
	}

	impl RandomSource for FixedRandomSource {
		fn random_fragment(&self) -> String {
			self.0.clone()
		}
	}

	#[test]
	fn session_id_has_prefix_and_entropy() {
		let id = generate_session_id(&FixedRandomSource::new("abcdefgh12345"));
		assert!(id.starts_with("session_"));
		assert!(id.ends_with("_abcdefgh"));
	}

	#[test]
	fn user_id_has_prefix_and_entropy() {
		let id = generate_user_id(&FixedRandomSource::new("zyxwvuts98765"));
		assert!(id.starts_with("user_"));
		assert!(id.ends_with("_zyxwvuts"));
	}

	#[test]
	fn short_fragment_is_used_as_is() {
		let id = generate_session_id(&FixedRandomSource::new("ab"));
		assert!(id.ends_with("_ab"));
	}

	#[test]
	fn default_source_fragments_differ() {
		let source = DefaultRandomSource;
		assert_ne!(source.random_fragment(), source.random_fragment());
	}

	#[test]
	fn base36_encodes_known_values() {
		assert_eq!(base36(0), "0");
		assert_eq!(base36(35), "z");
		assert_eq!(base36(36), "10");
	}

	proptest! {
		#[test]
		fn generated_ids_parse_back(fragment in "[a-z0-9]{8,20}") {
			let source = FixedRandomSource(fragment.clone());
			let id = generate_session_id(&source);

			let rest = id.strip_prefix("session_").unwrap();
			let (millis, entropy) = rest.split_once('_').unwrap();
			prop_assert!(millis.parse::<i64>().is_ok());
			prop_assert_eq!(entropy, &fragment[..8]);
		}

		#[test]
		fn base36_roundtrips_via_parse(n in 0u64..u64::MAX) {
			let encoded = base36(n);
			prop_assert_eq!(u64::from_str_radix(&encoded, 36).unwrap(), n);
		}
	}
}
