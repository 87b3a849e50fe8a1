//! Emotion particle field: spawn, per-frame integration, debounced resize.

use super::emotion::Emotion;
use super::style::{Color, style_for};

/// Quiet period a resize request must survive before it is applied.
const RESIZE_DEBOUNCE_SECS: f64 = 0.15;

/// Speed/spread multipliers for the emphasis burst on mood change.
const BURST_SPEED_MULT: f64 = 1.8;
const BURST_SPREAD_MULT: f64 = 1.6;

/// A single transient particle. Owned exclusively by [`ParticleField`].
#[derive(Clone, Debug)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub size: f64,
	pub alpha: f64,
	pub fade_speed: f64,
	pub gravity: f64,
	pub color: Color,
}

/// Pool of live particles plus the canvas dimensions they move in.
///
/// Integration is per-frame, matching the render cadence: each [`tick`]
/// advances every particle by one velocity step and one alpha decrement, so a
/// particle born at alpha 1 with fade speed `f` survives exactly
/// `ceil(1 / f)` ticks.
///
/// [`tick`]: ParticleField::tick
pub struct ParticleField {
	particles: Vec<Particle>,
	width: f64,
	height: f64,
	rng_cursor: f64,
	pending_resize: Option<(f64, f64)>,
	resize_quiet: f64,
}

impl ParticleField {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			particles: Vec::new(),
			width,
			height,
			rng_cursor: 0.0,
			pending_resize: None,
			resize_quiet: 0.0,
		}
	}

	/// Simple pseudo-random function (deterministic)
	fn pseudo_random(seed: f64) -> f64 {
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}

	fn next_random(&mut self) -> f64 {
		self.rng_cursor += 1.0;
		Self::pseudo_random(self.rng_cursor * 7.13)
	}

	/// Spawn a batch of particles styled for `emotion` around an origin.
	pub fn spawn(&mut self, emotion: Emotion, origin_x: f64, origin_y: f64) {
		self.spawn_scaled(emotion, origin_x, origin_y, 1.0, 1.0);
	}

	/// Emphasis burst from the field center, used on mood change.
	pub fn burst(&mut self, emotion: Emotion) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		self.spawn_scaled(emotion, cx, cy, BURST_SPEED_MULT, BURST_SPREAD_MULT);
	}

	fn spawn_scaled(
		&mut self,
		emotion: Emotion,
		origin_x: f64,
		origin_y: f64,
		speed_mult: f64,
		spread_mult: f64,
	) {
		let style = style_for(emotion);
		let spread = style.spread * spread_mult;
		self.particles.reserve(style.particle_count);

		for i in 0..style.particle_count {
			let angle = self.next_random() * std::f64::consts::TAU;
			let speed = self.next_random() * style.speed * speed_mult;
			let jitter_x = (self.next_random() - 0.5) * 2.0 * spread;
			let jitter_y = (self.next_random() - 0.5) * 2.0 * spread;
			let size = style.size_min
				+ self.next_random() * (style.size_max - style.size_min);

			self.particles.push(Particle {
				x: origin_x + jitter_x,
				y: origin_y + jitter_y,
				vx: angle.cos() * speed,
				vy: angle.sin() * speed,
				size,
				alpha: 1.0,
				fade_speed: style.fade_speed,
				gravity: style.gravity,
				color: style.palette[i % style.palette.len()],
			});
		}
	}

	/// Advance every particle one frame and count down the resize debounce.
	///
	/// Returns the new dimensions when a debounced resize fires this tick;
	/// the caller applies them to the canvas backing store.
	pub fn tick(&mut self, dt: f64) -> Option<(f64, f64)> {
		for p in &mut self.particles {
			p.x += p.vx;
			p.y += p.vy + p.gravity;
			p.alpha -= p.fade_speed;
		}
		self.particles.retain(|p| p.alpha > 0.0);

		if let Some((w, h)) = self.pending_resize {
			self.resize_quiet -= dt;
			if self.resize_quiet <= 0.0 {
				self.pending_resize = None;
				self.width = w;
				self.height = h;
				return Some((w, h));
			}
		}
		None
	}

	/// Request new dimensions. Rapid-fire requests collapse: each call resets
	/// the quiet timer and overwrites the pending dimensions, so only the
	/// last request within a burst is applied.
	pub fn request_resize(&mut self, width: f64, height: f64) {
		self.pending_resize = Some((width, height));
		self.resize_quiet = RESIZE_DEBOUNCE_SECS;
	}

	/// Whether a resize is waiting on its quiet period.
	pub fn resize_pending(&self) -> bool {
		self.pending_resize.is_some()
	}

	pub fn particles(&self) -> &[Particle] {
		&self.particles
	}

	pub fn len(&self) -> usize {
		self.particles.len()
	}

	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// Drop all live particles (shutdown path).
	pub fn clear(&mut self) {
		self.particles.clear();
	}

	pub fn width(&self) -> f64 {
		self.width
	}

	pub fn height(&self) -> f64 {
		self.height
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const DT: f64 = 1.0 / 60.0;

	#[test]
	fn spawn_creates_styled_count() {
		let mut field = ParticleField::new(800.0, 600.0);
		field.spawn(Emotion::Happy, 400.0, 300.0);
		assert_eq!(field.len(), style_for(Emotion::Happy).particle_count);
	}

	#[test]
	fn unknown_emotion_spawns_neutral_count() {
		let mut field = ParticleField::new(800.0, 600.0);
		field.spawn(Emotion::from_tag("???"), 400.0, 300.0);
		assert_eq!(field.len(), style_for(Emotion::Neutral).particle_count);
	}

	#[test]
	fn particle_dies_after_ceil_inverse_fade_ticks() {
		let mut field = ParticleField::new(100.0, 100.0);
		field.particles.push(Particle {
			x: 0.0,
			y: 0.0,
			vx: 0.0,
			vy: 0.0,
			size: 1.0,
			alpha: 1.0,
			fade_speed: 0.3,
			gravity: 0.0,
			color: Color::rgb(255, 255, 255),
		});

		let expected = (1.0f64 / 0.3).ceil() as usize; // 4
		for i in 1..=expected {
			field.tick(DT);
			if i < expected {
				assert_eq!(field.len(), 1, "alive after tick {i}");
			}
		}
		assert!(field.is_empty(), "removed on tick {expected}");
	}

	#[test]
	fn gravity_drifts_position_not_velocity() {
		let mut field = ParticleField::new(100.0, 100.0);
		field.particles.push(Particle {
			x: 0.0,
			y: 0.0,
			vx: 1.0,
			vy: 2.0,
			size: 1.0,
			alpha: 1.0,
			fade_speed: 0.01,
			gravity: -0.5,
			color: Color::rgb(255, 255, 255),
		});

		field.tick(DT);
		field.tick(DT);
		let p = &field.particles()[0];
		assert!((p.x - 2.0).abs() < 1e-9);
		assert!((p.y - 3.0).abs() < 1e-9); // 2 * (vy + gravity)
		assert!((p.vy - 2.0).abs() < 1e-9);
	}

	#[test]
	fn rapid_resizes_apply_once_after_quiet_period() {
		let mut field = ParticleField::new(800.0, 600.0);

		// 10 requests inside 50 ms: only the last survives.
		let mut applied = 0;
		for i in 0..10 {
			field.request_resize(1000.0 + i as f64, 500.0);
			if field.tick(0.005).is_some() {
				applied += 1;
			}
		}
		assert_eq!(applied, 0);
		assert!(field.resize_pending());

		// Quiet period elapses.
		let mut result = None;
		for _ in 0..12 {
			if let Some(dims) = field.tick(DT) {
				applied += 1;
				result = Some(dims);
			}
		}
		assert_eq!(applied, 1);
		assert_eq!(result, Some((1009.0, 500.0)));
		assert!(!field.resize_pending());
	}

	#[test]
	fn burst_spawns_from_center() {
		let mut field = ParticleField::new(200.0, 100.0);
		field.burst(Emotion::Excited);
		let style = style_for(Emotion::Excited);
		assert_eq!(field.len(), style.particle_count);
		let max_spread = style.spread * BURST_SPREAD_MULT;
		for p in field.particles() {
			assert!((p.x - 100.0).abs() <= max_spread);
			assert!((p.y - 50.0).abs() <= max_spread);
		}
	}
}
