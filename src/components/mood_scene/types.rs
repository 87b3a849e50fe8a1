//! Page-provided configuration for the mood scene.

use serde::Deserialize;

/// Interface language. Arabic is the product default and renders RTL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
	#[default]
	Ar,
	En,
}

impl Lang {
	pub fn code(self) -> &'static str {
		match self {
			Self::Ar => "ar",
			Self::En => "en",
		}
	}

	pub fn dir(self) -> &'static str {
		match self {
			Self::Ar => "rtl",
			Self::En => "ltr",
		}
	}

	/// Built-in greeting used when the page supplies none (or its fetch-based
	/// greeting source failed upstream).
	pub fn fallback_greeting(self) -> &'static str {
		match self {
			Self::Ar => "مرحباً بك في مشاعر",
			Self::En => "Welcome to Mashaaer",
		}
	}
}

/// Scene configuration, read once at mount from a JSON script element.
/// Missing fields take their defaults; a malformed document falls back to
/// `SceneConfig::default()` entirely.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
	pub lang: Lang,
	/// Tag of the mood to enter right after mount. Unknown tags mean neutral.
	pub start_mood: String,
	/// Ambient target volume in [0, 1].
	pub volume: f64,
	pub muted: bool,
	/// Base path for ambient tracks and cues.
	pub sound_base: String,
	/// One-shot cue volume in [0, 1].
	pub cue_volume: f64,
	pub particles_enabled: bool,
	pub star_count: usize,
	/// Greeting text override; falls back to the built-in localized string.
	pub greeting: Option<String>,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			lang: Lang::Ar,
			start_mood: "neutral".to_string(),
			volume: 0.6,
			muted: false,
			sound_base: "static/sounds".to_string(),
			cue_volume: 0.8,
			particles_enabled: true,
			star_count: 140,
			greeting: None,
		}
	}
}

impl SceneConfig {
	/// Greeting to display, configured or built-in.
	pub fn greeting_text(&self) -> String {
		self.greeting
			.clone()
			.unwrap_or_else(|| self.lang.fallback_greeting().to_string())
	}
}
