//! Visual and audio styling per emotion.
//!
//! One immutable table maps every [`Emotion`] to its mood theme: color
//! palette, particle behavior, background wash, and the ambient/cue sound
//! identifiers. Styling is data here, not literals scattered through the
//! animation code, so the particle mechanics stay independently testable.

use super::emotion::Emotion;

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Linear interpolation between two colors.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * (1.0 - t) + other.r as f64 * t) as u8,
			g: (self.g as f64 * (1.0 - t) + other.g as f64 * t) as u8,
			b: (self.b as f64 * (1.0 - t) + other.b as f64 * t) as u8,
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Complete mood theme for one emotion. Created once as static configuration;
/// never mutated at runtime.
#[derive(Clone, Copy, Debug)]
pub struct EmotionStyle {
	/// Ordered particle color palette; spawn cycles through it.
	pub palette: &'static [Color],
	/// Particles created per `spawn` call.
	pub particle_count: usize,
	/// Upper bound for randomized particle launch speed (px per tick).
	pub speed: f64,
	/// Particle size range [min, max] in px.
	pub size_min: f64,
	pub size_max: f64,
	/// Per-tick vertical drift. Negative drifts upward.
	pub gravity: f64,
	/// Per-tick alpha decrement; a particle born at alpha 1 lives
	/// `ceil(1 / fade_speed)` ticks.
	pub fade_speed: f64,
	/// Positional jitter radius around the spawn origin, in px.
	pub spread: f64,
	/// Center tint of the background wash gradient.
	pub wash: Color,
	/// Looping ambient track identifier.
	pub ambient_track: &'static str,
	/// Default one-shot cue played when transitioning into this emotion.
	pub cue: &'static str,
}

const HAPPY_PALETTE: &[Color] = &[
	Color::rgb(255, 215, 80),
	Color::rgb(255, 170, 60),
	Color::rgb(255, 240, 150),
	Color::rgb(250, 200, 100),
];

const SAD_PALETTE: &[Color] = &[
	Color::rgb(70, 100, 180),
	Color::rgb(90, 120, 200),
	Color::rgb(50, 80, 150),
	Color::rgb(120, 140, 210),
];

const ANGRY_PALETTE: &[Color] = &[
	Color::rgb(220, 60, 50),
	Color::rgb(255, 90, 60),
	Color::rgb(180, 40, 40),
	Color::rgb(255, 130, 80),
];

const NEUTRAL_PALETTE: &[Color] = &[
	Color::rgb(180, 170, 220),
	Color::rgb(200, 195, 235),
	Color::rgb(160, 160, 200),
	Color::rgb(220, 215, 245),
];

const SURPRISED_PALETTE: &[Color] = &[
	Color::rgb(90, 220, 240),
	Color::rgb(255, 235, 120),
	Color::rgb(140, 240, 255),
	Color::rgb(250, 250, 180),
];

const FEARFUL_PALETTE: &[Color] = &[
	Color::rgb(110, 80, 160),
	Color::rgb(80, 110, 90),
	Color::rgb(90, 70, 130),
	Color::rgb(60, 85, 110),
];

const DISGUSTED_PALETTE: &[Color] = &[
	Color::rgb(110, 160, 70),
	Color::rgb(140, 180, 90),
	Color::rgb(90, 140, 60),
	Color::rgb(160, 190, 110),
];

const EXCITED_PALETTE: &[Color] = &[
	Color::rgb(240, 80, 180),
	Color::rgb(255, 140, 90),
	Color::rgb(220, 100, 240),
	Color::rgb(255, 180, 120),
];

const CONFUSED_PALETTE: &[Color] = &[
	Color::rgb(150, 120, 200),
	Color::rgb(110, 170, 180),
	Color::rgb(180, 140, 160),
	Color::rgb(130, 150, 210),
];

static HAPPY: EmotionStyle = EmotionStyle {
	palette: HAPPY_PALETTE,
	particle_count: 60,
	speed: 2.4,
	size_min: 1.5,
	size_max: 4.0,
	gravity: -0.25,
	fade_speed: 0.010,
	spread: 26.0,
	wash: Color::rgb(70, 55, 20),
	ambient_track: "cosmic_joy",
	cue: "chime_rise",
};

static SAD: EmotionStyle = EmotionStyle {
	palette: SAD_PALETTE,
	particle_count: 35,
	speed: 1.0,
	size_min: 1.0,
	size_max: 3.0,
	gravity: 0.35,
	fade_speed: 0.006,
	spread: 18.0,
	wash: Color::rgb(18, 28, 60),
	ambient_track: "cosmic_rain",
	cue: "bell_low",
};

static ANGRY: EmotionStyle = EmotionStyle {
	palette: ANGRY_PALETTE,
	particle_count: 80,
	speed: 3.6,
	size_min: 1.5,
	size_max: 4.5,
	gravity: -0.1,
	fade_speed: 0.020,
	spread: 34.0,
	wash: Color::rgb(70, 18, 14),
	ambient_track: "cosmic_storm",
	cue: "impact_soft",
};

static NEUTRAL: EmotionStyle = EmotionStyle {
	palette: NEUTRAL_PALETTE,
	particle_count: 40,
	speed: 1.4,
	size_min: 1.0,
	size_max: 3.0,
	gravity: 0.0,
	fade_speed: 0.008,
	spread: 22.0,
	wash: Color::rgb(30, 28, 50),
	ambient_track: "cosmic_calm",
	cue: "transition_soft",
};

static SURPRISED: EmotionStyle = EmotionStyle {
	palette: SURPRISED_PALETTE,
	particle_count: 70,
	speed: 3.0,
	size_min: 1.5,
	size_max: 4.0,
	gravity: -0.3,
	fade_speed: 0.016,
	spread: 38.0,
	wash: Color::rgb(20, 55, 65),
	ambient_track: "cosmic_shimmer",
	cue: "sparkle_pop",
};

static FEARFUL: EmotionStyle = EmotionStyle {
	palette: FEARFUL_PALETTE,
	particle_count: 45,
	speed: 2.0,
	size_min: 0.8,
	size_max: 2.5,
	gravity: 0.2,
	fade_speed: 0.012,
	spread: 30.0,
	wash: Color::rgb(30, 20, 48),
	ambient_track: "cosmic_drone",
	cue: "tremor",
};

static DISGUSTED: EmotionStyle = EmotionStyle {
	palette: DISGUSTED_PALETTE,
	particle_count: 40,
	speed: 1.6,
	size_min: 1.2,
	size_max: 3.5,
	gravity: 0.15,
	fade_speed: 0.010,
	spread: 24.0,
	wash: Color::rgb(26, 45, 20),
	ambient_track: "cosmic_murk",
	cue: "slide_down",
};

static EXCITED: EmotionStyle = EmotionStyle {
	palette: EXCITED_PALETTE,
	particle_count: 90,
	speed: 4.0,
	size_min: 1.5,
	size_max: 5.0,
	gravity: -0.35,
	fade_speed: 0.018,
	spread: 42.0,
	wash: Color::rgb(60, 22, 55),
	ambient_track: "cosmic_pulse",
	cue: "chime_burst",
};

static CONFUSED: EmotionStyle = EmotionStyle {
	palette: CONFUSED_PALETTE,
	particle_count: 50,
	speed: 1.8,
	size_min: 1.0,
	size_max: 3.5,
	gravity: 0.05,
	fade_speed: 0.010,
	spread: 32.0,
	wash: Color::rgb(38, 32, 58),
	ambient_track: "cosmic_drift",
	cue: "warble",
};

/// Look up the style for an emotion. Total: every member of the closed set
/// has an entry, and callers that hold a raw tag go through
/// [`Emotion::from_tag`] first, so unknown input lands on the neutral style.
pub fn style_for(emotion: Emotion) -> &'static EmotionStyle {
	match emotion {
		Emotion::Happy => &HAPPY,
		Emotion::Sad => &SAD,
		Emotion::Angry => &ANGRY,
		Emotion::Neutral => &NEUTRAL,
		Emotion::Surprised => &SURPRISED,
		Emotion::Fearful => &FEARFUL,
		Emotion::Disgusted => &DISGUSTED,
		Emotion::Excited => &EXCITED,
		Emotion::Confused => &CONFUSED,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_emotion_has_a_style() {
		for e in Emotion::ALL {
			let style = style_for(e);
			assert!(!style.palette.is_empty());
			assert!(style.particle_count > 0);
			assert!(style.fade_speed > 0.0);
			assert!(style.size_min <= style.size_max);
			assert!(!style.ambient_track.is_empty());
			assert!(!style.cue.is_empty());
		}
	}

	#[test]
	fn unknown_tag_resolves_to_neutral_style() {
		let style = style_for(Emotion::from_tag("bogus"));
		assert_eq!(style.ambient_track, NEUTRAL.ambient_track);
		assert_eq!(style.particle_count, NEUTRAL.particle_count);
	}

	#[test]
	fn color_lerp_endpoints() {
		let a = Color::rgb(0, 0, 0);
		let b = Color::rgb(200, 100, 50);
		let at_zero = a.lerp(b, 0.0);
		let at_one = a.lerp(b, 1.0);
		assert_eq!((at_zero.r, at_zero.g, at_zero.b), (0, 0, 0));
		assert_eq!((at_one.r, at_one.g, at_one.b), (200, 100, 50));
	}

	#[test]
	fn color_css_formats() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(Color::rgba(10, 20, 30, 0.5).to_css(), "rgba(10, 20, 30, 0.5)");
	}
}
