//! The closed emotion vocabulary shared by every scene subsystem.
//!
//! Emotion tags arrive from an external classifier as free-form strings;
//! everything downstream works on the closed [`Emotion`] set, with unknown
//! input normalizing to [`Emotion::Neutral`] rather than failing.

use serde::{Deserialize, Serialize};

/// A detected or declared mood, one of a fixed closed set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
	Happy,
	Sad,
	Angry,
	/// Baseline mood. `"calm"` parses to this variant as well.
	Neutral,
	Surprised,
	Fearful,
	Disgusted,
	Excited,
	Confused,
}

impl Emotion {
	/// Every member of the closed set.
	pub const ALL: [Emotion; 9] = [
		Self::Happy,
		Self::Sad,
		Self::Angry,
		Self::Neutral,
		Self::Surprised,
		Self::Fearful,
		Self::Disgusted,
		Self::Excited,
		Self::Confused,
	];

	/// Parse a classifier tag. Case-insensitive; surrounding whitespace is
	/// ignored; anything outside the closed set resolves to `Neutral`.
	pub fn from_tag(tag: &str) -> Self {
		match tag.trim().to_ascii_lowercase().as_str() {
			"happy" => Self::Happy,
			"sad" => Self::Sad,
			"angry" => Self::Angry,
			"neutral" | "calm" => Self::Neutral,
			"surprised" => Self::Surprised,
			"fearful" => Self::Fearful,
			"disgusted" => Self::Disgusted,
			"excited" => Self::Excited,
			"confused" => Self::Confused,
			_ => Self::Neutral,
		}
	}

	/// Canonical lowercase tag, as emitted in outgoing events and used for
	/// the DOM theme attribute.
	pub fn tag(self) -> &'static str {
		match self {
			Self::Happy => "happy",
			Self::Sad => "sad",
			Self::Angry => "angry",
			Self::Neutral => "neutral",
			Self::Surprised => "surprised",
			Self::Fearful => "fearful",
			Self::Disgusted => "disgusted",
			Self::Excited => "excited",
			Self::Confused => "confused",
		}
	}
}

impl Default for Emotion {
	fn default() -> Self {
		Self::Neutral
	}
}
