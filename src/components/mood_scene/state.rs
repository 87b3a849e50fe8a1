//! Scene composition: one struct owning every subsystem, mutated only from
//! the frame tick and the event entry points.

use super::audio::{AmbientAudioManager, AudioBackend};
use super::controller::{MoodSink, MoodThemeController};
use super::cosmos::StarField;
use super::cues::TransitionSoundManager;
use super::emotion::Emotion;
use super::particles::ParticleField;

/// Everything the mood scene owns. Created once at mount, advanced by
/// [`tick`] from the animation loop.
///
/// [`tick`]: MoodScene::tick
pub struct MoodScene<B: AudioBackend, S: MoodSink> {
	field: ParticleField,
	stars: StarField,
	audio: AmbientAudioManager<B>,
	cues: TransitionSoundManager<B>,
	controller: MoodThemeController,
	sink: S,
	particles_enabled: bool,
}

impl<B: AudioBackend, S: MoodSink> MoodScene<B, S> {
	pub fn new(
		width: f64,
		height: f64,
		star_count: usize,
		particles_enabled: bool,
		audio: AmbientAudioManager<B>,
		cues: TransitionSoundManager<B>,
		sink: S,
	) -> Self {
		Self {
			field: ParticleField::new(width, height),
			stars: StarField::new(star_count, width, height),
			audio,
			cues,
			controller: MoodThemeController::new(Emotion::Neutral),
			sink,
			particles_enabled,
		}
	}

	/// Validate, dedupe, and fan out a mood change. Dropped requests (same
	/// mood, or a transition in flight) touch nothing downstream.
	pub fn set_mood(&mut self, mood: Emotion) {
		let Some((from, to)) = self.controller.begin(mood) else {
			return;
		};
		self.sink.apply_theme(to);
		if self.particles_enabled {
			self.field.burst(to);
		}
		self.audio.set_emotion(to);
		self.cues.play_cue(from, to);
		self.sink.announce(from, to);
	}

	/// Raw-tag entry point for DOM events; unknown tags become neutral.
	pub fn set_mood_tag(&mut self, tag: &str) {
		self.set_mood(Emotion::from_tag(tag));
	}

	/// Spawn particles at an arbitrary origin in the current mood's style.
	pub fn sparkle_at(&mut self, x: f64, y: f64) {
		if self.particles_enabled {
			self.field.spawn(self.controller.current(), x, y);
		}
	}

	/// Advance every subsystem one frame. Returns newly applied canvas
	/// dimensions when a debounced resize fires; the star layer is already
	/// regenerated for them.
	pub fn tick(&mut self, dt: f64) -> Option<(f64, f64)> {
		let applied = self.field.tick(dt);
		if let Some((w, h)) = applied {
			self.stars.resize(w, h);
		}
		self.stars.update(dt);
		self.audio.tick(dt);
		self.cues.tick(dt);
		self.controller.tick(dt);
		applied
	}

	/// Whether anything still needs animation frames. The star layer alone
	/// does not: an otherwise idle scene freezes on its last frame instead of
	/// scheduling forever.
	pub fn needs_frame(&self) -> bool {
		!self.field.is_empty()
			|| self.field.resize_pending()
			|| self.audio.is_active()
			|| self.cues.is_fading()
			|| self.controller.is_transitioning()
	}

	pub fn request_resize(&mut self, width: f64, height: f64) {
		self.field.request_resize(width, height);
	}

	/// Ambient volume control, forwarded clamped.
	pub fn set_volume(&mut self, volume: f64) {
		self.audio.set_volume(volume);
	}

	pub fn set_muted(&mut self, muted: bool) {
		self.audio.set_muted(muted);
	}

	/// Fade out and release the ambient track.
	pub fn stop_audio(&mut self) {
		self.audio.stop();
	}

	/// A qualifying user interaction occurred.
	pub fn user_gesture(&mut self) {
		self.audio.user_gesture();
		self.cues.unlock();
	}

	/// Page-unload teardown: neutral mood, every timer-dependent activity
	/// cancelled, every audio handle released.
	pub fn shutdown(&mut self) {
		self.controller.reset();
		self.field.clear();
		self.cues.stop_all(false, 0.0);
		self.audio.halt();
	}

	pub fn field(&self) -> &ParticleField {
		&self.field
	}

	pub fn stars(&self) -> &StarField {
		&self.stars
	}

	pub fn controller(&self) -> &MoodThemeController {
		&self.controller
	}

	pub fn audio(&self) -> &AmbientAudioManager<B> {
		&self.audio
	}
}
