//! Ambient cosmic background: twinkling stars and occasional meteors.
//!
//! Purely decorative layer behind the emotion particles. Stars are placed
//! deterministically so the sky looks the same on every load; the whole layer
//! is regenerated when a debounced resize lands.

use super::style::Color;

/// Seconds of a meteor's streak from spawn to gone.
const METEOR_LIFE_SECS: f64 = 1.2;

/// Gap between meteors: base plus a randomized surplus.
const METEOR_GAP_MIN_SECS: f64 = 6.0;
const METEOR_GAP_JITTER_SECS: f64 = 14.0;

/// A single background star.
#[derive(Clone, Debug)]
pub struct Star {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub size: f64,
	pub alpha: f64,
	pub phase: f64, // For twinkling
}

/// A meteor streak. `life` runs 1 → 0.
#[derive(Clone, Debug)]
pub struct Meteor {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub life: f64,
}

/// Manages the star/meteor background layer.
pub struct StarField {
	pub stars: Vec<Star>,
	pub meteors: Vec<Meteor>,
	count: usize,
	width: f64,
	height: f64,
	time: f64,
	meteor_countdown: f64,
	rng_cursor: f64,
}

impl StarField {
	pub fn new(count: usize, width: f64, height: f64) -> Self {
		let mut field = Self {
			stars: Vec::new(),
			meteors: Vec::new(),
			count,
			width,
			height,
			time: 0.0,
			meteor_countdown: METEOR_GAP_MIN_SECS,
			rng_cursor: 0.0,
		};
		field.regenerate();
		field
	}

	/// Simple pseudo-random function (deterministic)
	fn pseudo_random(seed: f64) -> f64 {
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}

	fn next_random(&mut self) -> f64 {
		self.rng_cursor += 1.0;
		Self::pseudo_random(self.rng_cursor * 3.77)
	}

	/// Rebuild all stars for the current dimensions. Placement is keyed by
	/// index, so equal dimensions produce an identical sky.
	fn regenerate(&mut self) {
		self.stars.clear();
		self.stars.reserve(self.count);

		for i in 0..self.count {
			let seed = i as f64;
			let px = Self::pseudo_random(seed * 1.1) * self.width;
			let py = Self::pseudo_random(seed * 2.3) * self.height;
			let angle = Self::pseudo_random(seed * 3.7) * std::f64::consts::TAU;
			let speed = 2.0 + Self::pseudo_random(seed * 4.1) * 3.0;

			self.stars.push(Star {
				x: px,
				y: py,
				vx: angle.cos() * speed,
				vy: angle.sin() * speed,
				size: 0.4 + Self::pseudo_random(seed * 5.3) * 1.4,
				alpha: 0.3 + Self::pseudo_random(seed * 6.7) * 0.7,
				phase: Self::pseudo_random(seed * 7.9) * std::f64::consts::TAU,
			});
		}
	}

	/// Advance drift, twinkle time, and meteor lifecycle.
	pub fn update(&mut self, dt: f64) {
		self.time += dt;

		for s in &mut self.stars {
			s.x += s.vx * dt;
			s.y += s.vy * dt;

			// Wrap around screen edges
			if s.x < -10.0 {
				s.x = self.width + 10.0;
			} else if s.x > self.width + 10.0 {
				s.x = -10.0;
			}
			if s.y < -10.0 {
				s.y = self.height + 10.0;
			} else if s.y > self.height + 10.0 {
				s.y = -10.0;
			}
		}

		for m in &mut self.meteors {
			m.x += m.vx * dt;
			m.y += m.vy * dt;
			m.life -= dt / METEOR_LIFE_SECS;
		}
		self.meteors.retain(|m| m.life > 0.0);

		self.meteor_countdown -= dt;
		if self.meteor_countdown <= 0.0 {
			self.spawn_meteor();
			self.meteor_countdown =
				METEOR_GAP_MIN_SECS + self.next_random() * METEOR_GAP_JITTER_SECS;
		}
	}

	fn spawn_meteor(&mut self) {
		let from_left = self.next_random() < 0.5;
		let x = self.next_random() * self.width;
		let speed = 300.0 + self.next_random() * 300.0;
		let dir = if from_left { 1.0 } else { -1.0 };
		let y = self.next_random() * self.height * 0.4;

		self.meteors.push(Meteor {
			x,
			y,
			vx: dir * speed,
			vy: speed * 0.55,
			life: 1.0,
		});
	}

	/// Regenerate the layer for new dimensions (called after the debounced
	/// resize fires; in-flight meteors are discarded).
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.meteors.clear();
		self.regenerate();
	}

	/// Twinkle-modulated alpha for a star at the field's current time.
	pub fn twinkle_alpha(&self, star: &Star) -> f64 {
		let twinkle = ((self.time * 1.5 + star.phase).sin() * 0.5 + 0.5) * 0.4 + 0.6;
		star.alpha * twinkle
	}

	/// Star draw color; meteors draw pure white.
	pub fn star_color(&self) -> Color {
		Color::rgb(220, 225, 255)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builds_requested_star_count() {
		let field = StarField::new(120, 800.0, 600.0);
		assert_eq!(field.stars.len(), 120);
		for s in &field.stars {
			assert!((0.0..=800.0).contains(&s.x));
			assert!((0.0..=600.0).contains(&s.y));
		}
	}

	#[test]
	fn placement_is_deterministic() {
		let a = StarField::new(50, 640.0, 480.0);
		let b = StarField::new(50, 640.0, 480.0);
		for (sa, sb) in a.stars.iter().zip(&b.stars) {
			assert_eq!(sa.x, sb.x);
			assert_eq!(sa.y, sb.y);
		}
	}

	#[test]
	fn resize_regenerates_within_new_bounds() {
		let mut field = StarField::new(80, 800.0, 600.0);
		field.update(1.0);
		field.resize(300.0, 200.0);
		assert_eq!(field.stars.len(), 80);
		for s in &field.stars {
			assert!((0.0..=300.0).contains(&s.x));
			assert!((0.0..=200.0).contains(&s.y));
		}
		assert!(field.meteors.is_empty());
	}

	#[test]
	fn meteors_spawn_and_expire() {
		let mut field = StarField::new(10, 800.0, 600.0);
		// Past the first countdown: at least one meteor spawned.
		let mut seen = false;
		for _ in 0..800 {
			field.update(0.05);
			seen |= !field.meteors.is_empty();
		}
		assert!(seen);
		// Long idle stretch with no update bursts leaves none stuck forever.
		for _ in 0..100 {
			field.update(METEOR_LIFE_SECS);
		}
		assert!(field.meteors.len() <= 1);
	}

	#[test]
	fn twinkle_stays_within_star_alpha() {
		let mut field = StarField::new(30, 800.0, 600.0);
		for _ in 0..60 {
			field.update(0.016);
			for s in &field.stars {
				let a = field.twinkle_alpha(s);
				assert!(a > 0.0 && a <= s.alpha + 1e-9);
			}
		}
	}
}
