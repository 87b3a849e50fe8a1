//! One-shot transition cues, debounced per (from, to) emotion pair.

use std::collections::HashMap;

use log::warn;

use super::audio::{AudioBackend, AudioHandle};
use super::emotion::Emotion;
use super::style::style_for;

/// Minimum gap between two cues for the same (from, to) pair, in seconds.
pub const CUE_DEBOUNCE_SECS: f64 = 0.3;

/// Cues for specific transitions. Pairs not listed fall back to the target
/// emotion's default cue from the style table.
const PAIR_CUES: &[(Emotion, Emotion, &str)] = &[
	(Emotion::Neutral, Emotion::Happy, "dawn_rise"),
	(Emotion::Happy, Emotion::Sad, "fall_gentle"),
	(Emotion::Sad, Emotion::Happy, "lift_warm"),
	(Emotion::Angry, Emotion::Neutral, "settle_breath"),
	(Emotion::Fearful, Emotion::Neutral, "settle_breath"),
	(Emotion::Neutral, Emotion::Excited, "spark_cascade"),
];

/// Resolve the cue identifier for a transition.
pub fn cue_for(from: Emotion, to: Emotion) -> &'static str {
	PAIR_CUES
		.iter()
		.find(|(f, t, _)| *f == from && *t == to)
		.map(|(_, _, cue)| *cue)
		.unwrap_or_else(|| style_for(to).cue)
}

struct ActiveCue<H> {
	handle: H,
	volume: f64,
	/// Zero until `stop_all(fade)` arms a ramp.
	fade_rate: f64,
}

/// Fire-and-forget cue playback. Failures are logged, never propagated; a
/// repeat of the same pair inside the debounce window is a silent no-op.
pub struct TransitionSoundManager<B: AudioBackend> {
	backend: B,
	volume: f64,
	/// Monotonic clock advanced by `tick`; debounce timestamps live on it.
	now: f64,
	last_played: HashMap<(Emotion, Emotion), f64>,
	active: Vec<ActiveCue<B::Handle>>,
}

impl<B: AudioBackend> TransitionSoundManager<B> {
	pub fn new(backend: B, volume: f64) -> Self {
		Self {
			backend,
			volume: volume.clamp(0.0, 1.0),
			now: 0.0,
			last_played: HashMap::new(),
			active: Vec::new(),
		}
	}

	/// Play the cue for a transition unless the same pair sounded within the
	/// debounce window.
	pub fn play_cue(&mut self, from: Emotion, to: Emotion) {
		let key = (from, to);
		if let Some(&at) = self.last_played.get(&key) {
			if self.now - at < CUE_DEBOUNCE_SECS {
				return;
			}
		}

		if !self.backend.can_play() {
			warn!("cue suppressed: audio locked by autoplay policy");
			return;
		}

		let cue = cue_for(from, to);
		let Some(mut handle) = self.backend.load(cue, false) else {
			warn!("cue {cue} unavailable");
			return;
		};
		handle.set_volume(self.volume);
		if !handle.start() {
			warn!("cue {cue} playback denied");
			handle.stop();
			return;
		}
		// Only cues that actually sounded arm the debounce window.
		self.last_played.insert(key, self.now);
		self.active.push(ActiveCue {
			handle,
			volume: self.volume,
			fade_rate: 0.0,
		});
	}

	/// Ramp every sounding cue to zero over `duration_secs` (when `fade_out`)
	/// or halt them immediately, releasing their handles.
	pub fn stop_all(&mut self, fade_out: bool, duration_secs: f64) {
		if !fade_out || duration_secs <= 0.0 {
			for cue in &mut self.active {
				cue.handle.stop();
			}
			self.active.clear();
			return;
		}
		for cue in &mut self.active {
			cue.fade_rate = (cue.volume.max(0.01)) / duration_secs;
		}
	}

	/// Record that a qualifying user gesture occurred.
	pub fn unlock(&mut self) {
		self.backend.unlock();
	}

	/// Whether any cue is mid fade-out (the only cue state needing frames).
	pub fn is_fading(&self) -> bool {
		self.active.iter().any(|c| c.fade_rate > 0.0)
	}

	pub fn active_count(&self) -> usize {
		self.active.len()
	}

	/// Advance the debounce clock, apply fade ramps, reap finished cues.
	pub fn tick(&mut self, dt: f64) {
		self.now += dt;
		for cue in &mut self.active {
			if cue.fade_rate > 0.0 {
				cue.volume = (cue.volume - cue.fade_rate * dt).max(0.0);
				cue.handle.set_volume(cue.volume);
			}
		}
		self.active.retain_mut(|cue| {
			let done = cue.handle.is_ended() || (cue.fade_rate > 0.0 && cue.volume <= 0.0);
			if done {
				cue.handle.stop();
			}
			!done
		});
	}
}

#[cfg(test)]
mod tests {
	use super::super::audio::mock::MockBackend;
	use super::*;

	#[test]
	fn pair_table_with_style_fallback() {
		assert_eq!(cue_for(Emotion::Neutral, Emotion::Happy), "dawn_rise");
		assert_eq!(
			cue_for(Emotion::Confused, Emotion::Surprised),
			style_for(Emotion::Surprised).cue
		);
	}

	#[test]
	fn debounce_window_allows_one_cue() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		cues.tick(0.1); // 100 ms, inside the window
		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		assert_eq!(probe.load_count(), 1, "exactly one audible cue");

		cues.tick(CUE_DEBOUNCE_SECS);
		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		assert_eq!(probe.load_count(), 2, "window elapsed, cue plays again");
	}

	#[test]
	fn distinct_pairs_are_debounced_independently() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		cues.play_cue(Emotion::Happy, Emotion::Sad);
		assert_eq!(probe.load_count(), 2);
	}

	#[test]
	fn cues_play_at_configured_volume_non_looping() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.4);

		cues.play_cue(Emotion::Sad, Emotion::Happy);
		let track = probe.track(0);
		assert!(!track.borrow().looped);
		assert!((track.borrow().volume - 0.4).abs() < 1e-9);
		assert!(track.borrow().playing);
	}

	#[test]
	fn stop_all_immediate_releases_handles() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		cues.play_cue(Emotion::Happy, Emotion::Sad);
		cues.stop_all(false, 0.0);

		assert_eq!(cues.active_count(), 0);
		assert!(probe.track(0).borrow().released);
		assert!(probe.track(1).borrow().released);
	}

	#[test]
	fn stop_all_fade_ramps_then_releases() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		cues.stop_all(true, 0.5);
		assert!(cues.is_fading());

		for _ in 0..12 {
			cues.tick(0.05);
		}
		assert_eq!(cues.active_count(), 0);
		assert!(probe.track(0).borrow().released);
		assert!(!cues.is_fading());
	}

	#[test]
	fn ended_cues_are_reaped() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		probe.track(0).borrow_mut().ended = true;
		cues.tick(0.05);
		assert_eq!(cues.active_count(), 0);
	}

	#[test]
	fn locked_backend_suppresses_but_never_fails() {
		let backend = MockBackend::locked_backend();
		let probe = backend.clone();
		let mut cues = TransitionSoundManager::new(backend, 0.8);

		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		assert_eq!(probe.load_count(), 0);

		cues.unlock();
		cues.tick(CUE_DEBOUNCE_SECS + 0.05);
		cues.play_cue(Emotion::Neutral, Emotion::Happy);
		assert_eq!(probe.load_count(), 1);
	}
}
