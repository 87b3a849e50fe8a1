//! Ambient audio: one looping mood track at a time, crossfaded on change.
//!
//! The state machine is tick-driven: fades are volume ramps recomputed each
//! animation frame, never blocking waits. Platform audio sits behind the
//! [`AudioBackend`]/[`AudioHandle`] traits so the machine runs (and is tested)
//! without a browser; [`WebAudioBackend`] is the `HtmlAudioElement`
//! implementation used by the mounted component.

use log::warn;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use web_sys::HtmlAudioElement;

use super::emotion::Emotion;
use super::style::style_for;

/// Concurrent fade-out/fade-in window for a mood change, in seconds.
pub const CROSSFADE_SECS: f64 = 2.0;

/// One platform audio voice. Implementors own the underlying resource and
/// release it in [`stop`](AudioHandle::stop).
pub trait AudioHandle {
	/// Whether enough of the track is buffered to begin playback.
	fn is_ready(&self) -> bool;
	/// Begin playback. Returns `false` when the platform refuses.
	fn start(&mut self) -> bool;
	fn set_volume(&mut self, volume: f64);
	/// Whether a non-looping voice has played to completion.
	fn is_ended(&self) -> bool;
	/// Halt playback and release the underlying resource.
	fn stop(&mut self);
}

/// Creates [`AudioHandle`]s and tracks the autoplay-unlock state.
pub trait AudioBackend {
	type Handle: AudioHandle;

	/// Create a voice for a track identifier. `None` means the platform has
	/// no usable audio; callers degrade silently.
	fn load(&self, track: &str, looped: bool) -> Option<Self::Handle>;

	/// Whether playback is currently permitted (a qualifying user gesture
	/// has been observed).
	fn can_play(&self) -> bool;

	/// Record that a qualifying user gesture occurred.
	fn unlock(&mut self) {}
}

/// Lifecycle of the current ambient track.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmbientState {
	/// No track loaded.
	Idle,
	/// Track requested, waiting for it to become playable.
	Loading,
	/// Volume ramping from zero toward the target.
	FadingIn,
	/// Steady playback at the target volume.
	Playing,
	/// `stop()` requested; ramping to zero before release.
	FadingOut,
}

/// A superseded track ramping to zero. Released the moment it gets there.
struct OutgoingFade<H> {
	handle: H,
	volume: f64,
	rate: f64,
}

/// Owns at most one incoming/playing track plus at most one outgoing track
/// mid-crossfade. All volume mutation happens in [`tick`].
///
/// [`tick`]: AmbientAudioManager::tick
pub struct AmbientAudioManager<B: AudioBackend> {
	backend: B,
	state: AmbientState,
	current: Option<B::Handle>,
	current_emotion: Option<Emotion>,
	/// Fade-in/out progress of the current track, 0..=1.
	fade_t: f64,
	/// Last volume actually written to the current handle.
	applied: f64,
	/// Target volume while unmuted, clamped to [0, 1].
	target_volume: f64,
	muted: bool,
	/// Mute ramp, 1 = audible, 0 = silent. Moves toward `muted`'s target.
	mute_level: f64,
	/// Target captured when `stop` begins; later `set_volume` calls must not
	/// touch a track already ramping to zero.
	stop_scale: f64,
	outgoing: Option<OutgoingFade<B::Handle>>,
	/// Emotion requested while autoplay was locked.
	pending: Option<Emotion>,
	/// One retry is allowed per pending request.
	retry_armed: bool,
}

impl<B: AudioBackend> AmbientAudioManager<B> {
	pub fn new(backend: B, target_volume: f64) -> Self {
		Self {
			backend,
			state: AmbientState::Idle,
			current: None,
			current_emotion: None,
			fade_t: 0.0,
			applied: 0.0,
			target_volume: target_volume.clamp(0.0, 1.0),
			muted: false,
			mute_level: 1.0,
			stop_scale: 0.0,
			outgoing: None,
			pending: None,
			retry_armed: false,
		}
	}

	pub fn state(&self) -> AmbientState {
		self.state
	}

	pub fn current_emotion(&self) -> Option<Emotion> {
		self.current_emotion
	}

	/// Volume most recently written to the current track.
	pub fn current_volume(&self) -> f64 {
		self.applied
	}

	pub fn has_outgoing(&self) -> bool {
		self.outgoing.is_some()
	}

	pub fn pending_emotion(&self) -> Option<Emotion> {
		self.pending
	}

	/// Switch the ambient track to `emotion`'s mood audio.
	///
	/// No-op when that track is already current. When autoplay is locked the
	/// intent is recorded instead and retried once on the next user gesture.
	pub fn set_emotion(&mut self, emotion: Emotion) {
		if self.current_emotion == Some(emotion)
			&& matches!(
				self.state,
				AmbientState::Loading | AmbientState::FadingIn | AmbientState::Playing
			) {
			return;
		}

		if !self.backend.can_play() {
			self.pending = Some(emotion);
			self.retry_armed = true;
			warn!("ambient audio locked by autoplay policy; queued {}", emotion.tag());
			return;
		}

		let track = style_for(emotion).ambient_track;
		let Some(handle) = self.backend.load(track, true) else {
			warn!("ambient track {track} unavailable; staying on current audio");
			return;
		};

		self.retire_current();
		self.current = Some(handle);
		self.current_emotion = Some(emotion);
		self.fade_t = 0.0;
		self.applied = 0.0;
		self.state = AmbientState::Loading;
	}

	/// Move the current track (if audible) into the outgoing slot. An older
	/// outgoing track is released immediately so at most one fade-out runs.
	fn retire_current(&mut self) {
		let Some(handle) = self.current.take() else {
			return;
		};
		// A track still in Loading never produced sound; just release it.
		if self.state == AmbientState::Loading || self.applied <= 0.0 {
			let mut handle = handle;
			handle.stop();
			return;
		}
		if let Some(mut old) = self.outgoing.take() {
			old.handle.stop();
		}
		self.outgoing = Some(OutgoingFade {
			handle,
			volume: self.applied,
			rate: (self.applied.max(0.01)) / CROSSFADE_SECS,
		});
	}

	/// Clamp and apply a new target volume. Does not affect a track mid
	/// fade-out (that ramp ends at zero regardless).
	pub fn set_volume(&mut self, volume: f64) {
		self.target_volume = volume.clamp(0.0, 1.0);
	}

	/// Fade to silence without stopping (true) or back to the last target
	/// volume (false). Playback position is preserved either way.
	pub fn set_muted(&mut self, muted: bool) {
		self.muted = muted;
	}

	pub fn is_muted(&self) -> bool {
		self.muted
	}

	/// Fade out and release the current track, returning to `Idle`.
	pub fn stop(&mut self) {
		match self.state {
			AmbientState::Idle | AmbientState::FadingOut => {}
			AmbientState::Loading => {
				self.retire_current();
				self.current_emotion = None;
				self.state = AmbientState::Idle;
			}
			AmbientState::FadingIn | AmbientState::Playing => {
				self.stop_scale = self.target_volume;
				self.state = AmbientState::FadingOut;
			}
		}
		self.pending = None;
		self.retry_armed = false;
	}

	/// Immediately release every handle. Shutdown path; no fades.
	pub fn halt(&mut self) {
		if let Some(mut handle) = self.current.take() {
			handle.stop();
		}
		if let Some(mut out) = self.outgoing.take() {
			out.handle.stop();
		}
		self.current_emotion = None;
		self.pending = None;
		self.retry_armed = false;
		self.fade_t = 0.0;
		self.applied = 0.0;
		self.state = AmbientState::Idle;
	}

	/// A qualifying user interaction occurred: unlock the backend and retry
	/// a queued request, at most once per request.
	pub fn user_gesture(&mut self) {
		self.backend.unlock();
		if !self.retry_armed {
			return;
		}
		self.retry_armed = false;
		if let Some(emotion) = self.pending.take() {
			self.set_emotion(emotion);
		}
	}

	/// Whether the manager still needs animation frames (any ramp or load in
	/// flight). Steady playback needs none.
	pub fn is_active(&self) -> bool {
		if self.outgoing.is_some() {
			return true;
		}
		match self.state {
			AmbientState::Loading | AmbientState::FadingIn | AmbientState::FadingOut => true,
			AmbientState::Playing => {
				let mute_target = if self.muted { 0.0 } else { 1.0 };
				let settled = self.fade_t * self.target_volume * self.mute_level;
				(self.mute_level - mute_target).abs() > f64::EPSILON
					|| (self.applied - settled).abs() > 1e-9
			}
			AmbientState::Idle => false,
		}
	}

	/// Advance all ramps by `dt` seconds and write resulting volumes.
	pub fn tick(&mut self, dt: f64) {
		let step = dt / CROSSFADE_SECS;

		// Mute ramps at crossfade speed in both directions.
		let mute_target = if self.muted { 0.0 } else { 1.0 };
		if self.mute_level < mute_target {
			self.mute_level = (self.mute_level + step).min(mute_target);
		} else if self.mute_level > mute_target {
			self.mute_level = (self.mute_level - step).max(mute_target);
		}

		match self.state {
			AmbientState::Idle => {}
			AmbientState::Loading => {
				let ready = self.current.as_ref().is_some_and(AudioHandle::is_ready);
				if ready {
					let started = self.current.as_mut().map(AudioHandle::start).unwrap_or(false);
					if started {
						self.state = AmbientState::FadingIn;
					} else {
						// Denied after all; queue the intent for the next gesture.
						warn!("ambient playback denied; waiting for user interaction");
						self.pending = self.current_emotion.take();
						self.retry_armed = true;
						if let Some(mut handle) = self.current.take() {
							handle.stop();
						}
						self.state = AmbientState::Idle;
					}
				}
			}
			AmbientState::FadingIn => {
				self.fade_t = (self.fade_t + step).min(1.0);
				if self.fade_t >= 1.0 {
					self.state = AmbientState::Playing;
				}
			}
			AmbientState::Playing => {}
			AmbientState::FadingOut => {
				self.fade_t = (self.fade_t - step).max(0.0);
				if self.fade_t <= 0.0 {
					if let Some(mut handle) = self.current.take() {
						handle.stop();
					}
					self.current_emotion = None;
					self.state = AmbientState::Idle;
				}
			}
		}

		if let Some(handle) = self.current.as_mut() {
			let scale = if self.state == AmbientState::FadingOut {
				self.stop_scale
			} else {
				self.target_volume
			};
			let volume = self.fade_t * scale * self.mute_level;
			handle.set_volume(volume);
			self.applied = volume;
		} else {
			self.applied = 0.0;
		}

		let mut outgoing_done = false;
		if let Some(out) = self.outgoing.as_mut() {
			out.volume -= out.rate * dt;
			if out.volume <= 0.0 {
				out.handle.set_volume(0.0);
				out.handle.stop();
				outgoing_done = true;
			} else {
				let volume = out.volume * self.mute_level;
				out.handle.set_volume(volume);
			}
		}
		if outgoing_done {
			self.outgoing = None;
		}
	}
}

/// `HtmlAudioElement`-backed voice.
pub struct WebAudioHandle {
	element: HtmlAudioElement,
}

/// HAVE_FUTURE_DATA: enough buffered to start without an immediate stall.
const READY_STATE_PLAYABLE: u16 = 3;

impl AudioHandle for WebAudioHandle {
	fn is_ready(&self) -> bool {
		self.element.ready_state() >= READY_STATE_PLAYABLE
	}

	fn start(&mut self) -> bool {
		match self.element.play() {
			Ok(promise) => {
				// Swallow the rejection so a late autoplay denial never
				// surfaces as an unhandled rejection.
				let on_err = Closure::<dyn FnMut(JsValue)>::new(|_e: JsValue| {
					warn!("audio play() rejected by the platform");
				});
				let _ = promise.catch(&on_err);
				on_err.forget();
				true
			}
			Err(_) => false,
		}
	}

	fn set_volume(&mut self, volume: f64) {
		self.element.set_volume(volume.clamp(0.0, 1.0));
	}

	fn is_ended(&self) -> bool {
		self.element.ended()
	}

	fn stop(&mut self) {
		let _ = self.element.pause();
		// Dropping the src releases the decoder and network resources.
		self.element.set_src("");
	}
}

/// Backend creating `<audio>` elements for track identifiers under a
/// configured base path.
pub struct WebAudioBackend {
	base_path: String,
	unlocked: bool,
}

impl WebAudioBackend {
	pub fn new(base_path: impl Into<String>) -> Self {
		Self {
			base_path: base_path.into(),
			unlocked: false,
		}
	}
}

impl AudioBackend for WebAudioBackend {
	type Handle = WebAudioHandle;

	fn load(&self, track: &str, looped: bool) -> Option<WebAudioHandle> {
		let src = format!("{}/{}.mp3", self.base_path.trim_end_matches('/'), track);
		match HtmlAudioElement::new_with_src(&src) {
			Ok(element) => {
				element.set_loop(looped);
				element.set_preload("auto");
				element.set_volume(0.0);
				Some(WebAudioHandle { element })
			}
			Err(_) => {
				warn!("could not create audio element for {src}");
				None
			}
		}
	}

	fn can_play(&self) -> bool {
		self.unlocked
	}

	fn unlock(&mut self) {
		self.unlocked = true;
	}
}

#[cfg(test)]
pub(crate) mod mock {
	//! Recording audio backend shared by the audio, cue, and scene tests.

	use std::cell::RefCell;
	use std::rc::Rc;

	use super::{AudioBackend, AudioHandle};

	#[derive(Debug)]
	pub struct TrackState {
		pub track: String,
		pub looped: bool,
		pub ready: bool,
		pub playing: bool,
		pub volume: f64,
		pub ended: bool,
		pub released: bool,
	}

	pub struct MockHandle {
		pub state: Rc<RefCell<TrackState>>,
	}

	impl AudioHandle for MockHandle {
		fn is_ready(&self) -> bool {
			self.state.borrow().ready
		}

		fn start(&mut self) -> bool {
			self.state.borrow_mut().playing = true;
			true
		}

		fn set_volume(&mut self, volume: f64) {
			self.state.borrow_mut().volume = volume;
		}

		fn is_ended(&self) -> bool {
			self.state.borrow().ended
		}

		fn stop(&mut self) {
			let mut s = self.state.borrow_mut();
			s.playing = false;
			s.released = true;
		}
	}

	#[derive(Clone, Default)]
	pub struct MockBackend {
		pub loads: Rc<RefCell<Vec<Rc<RefCell<TrackState>>>>>,
		pub unlocked: Rc<RefCell<bool>>,
		/// When false, `load` reports the platform as audio-less.
		pub available: Rc<RefCell<bool>>,
	}

	impl MockBackend {
		pub fn unlocked_backend() -> Self {
			let backend = Self {
				available: Rc::new(RefCell::new(true)),
				..Self::default()
			};
			*backend.unlocked.borrow_mut() = true;
			backend
		}

		pub fn locked_backend() -> Self {
			Self {
				available: Rc::new(RefCell::new(true)),
				..Self::default()
			}
		}

		pub fn load_count(&self) -> usize {
			self.loads.borrow().len()
		}

		pub fn track(&self, idx: usize) -> Rc<RefCell<TrackState>> {
			self.loads.borrow()[idx].clone()
		}
	}

	impl AudioBackend for MockBackend {
		type Handle = MockHandle;

		fn load(&self, track: &str, looped: bool) -> Option<MockHandle> {
			if !*self.available.borrow() {
				return None;
			}
			let state = Rc::new(RefCell::new(TrackState {
				track: track.to_string(),
				looped,
				ready: true,
				playing: false,
				volume: 0.0,
				ended: false,
				released: false,
			}));
			self.loads.borrow_mut().push(state.clone());
			Some(MockHandle { state })
		}

		fn can_play(&self) -> bool {
			*self.unlocked.borrow()
		}

		fn unlock(&mut self) {
			*self.unlocked.borrow_mut() = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::mock::MockBackend;
	use super::*;

	const DT: f64 = 0.05;

	fn run_ticks(mgr: &mut AmbientAudioManager<MockBackend>, secs: f64) {
		let steps = (secs / DT).round() as usize;
		for _ in 0..steps {
			mgr.tick(DT);
		}
	}

	#[test]
	fn fades_in_to_target_then_plays() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 0.8);

		mgr.set_emotion(Emotion::Happy);
		assert_eq!(mgr.state(), AmbientState::Loading);

		mgr.tick(DT);
		assert_eq!(mgr.state(), AmbientState::FadingIn);
		assert!(probe.track(0).borrow().playing);

		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);
		assert_eq!(mgr.state(), AmbientState::Playing);
		assert!((mgr.current_volume() - 0.8).abs() < 1e-9);
		assert_eq!(probe.track(0).borrow().track, "cosmic_joy");
	}

	#[test]
	fn same_emotion_is_a_no_op() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 0.5);

		mgr.set_emotion(Emotion::Happy);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);
		assert_eq!(mgr.state(), AmbientState::Playing);

		mgr.set_emotion(Emotion::Happy);
		assert_eq!(mgr.state(), AmbientState::Playing);
		assert_eq!(probe.load_count(), 1, "no duplicate fade-in");
	}

	#[test]
	fn crossfade_overlaps_and_releases_previous() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 1.0);

		mgr.set_emotion(Emotion::Happy);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);

		mgr.set_emotion(Emotion::Sad);
		mgr.tick(DT);
		// Both audible mid-crossfade.
		assert!(mgr.has_outgoing());
		assert!(probe.track(0).borrow().volume > 0.0);
		assert!(probe.track(1).borrow().playing);

		run_ticks(&mut mgr, CROSSFADE_SECS + 0.2);
		assert_eq!(mgr.state(), AmbientState::Playing);
		assert!(!mgr.has_outgoing());
		let old = probe.track(0);
		assert!(old.borrow().released);
		assert!(old.borrow().volume <= 0.0 + 1e-9);
		assert_eq!(mgr.current_emotion(), Some(Emotion::Sad));
	}

	#[test]
	fn retarget_mid_fade_in_converges_to_one_track() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 1.0);

		mgr.set_emotion(Emotion::Happy);
		run_ticks(&mut mgr, 0.5);
		assert_eq!(mgr.state(), AmbientState::FadingIn);

		mgr.set_emotion(Emotion::Sad);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.2);

		assert_eq!(mgr.state(), AmbientState::Playing);
		assert_eq!(mgr.current_emotion(), Some(Emotion::Sad));
		assert!(!mgr.has_outgoing());
		assert!(probe.track(0).borrow().released, "happy handle fully released");
		assert!(probe.track(1).borrow().playing);
	}

	#[test]
	fn autoplay_denied_queues_and_retries_once() {
		let backend = MockBackend::locked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 0.7);

		mgr.set_emotion(Emotion::Excited);
		assert_eq!(mgr.state(), AmbientState::Idle);
		assert_eq!(mgr.pending_emotion(), Some(Emotion::Excited));
		assert_eq!(probe.load_count(), 0);

		mgr.user_gesture();
		assert_eq!(mgr.state(), AmbientState::Loading);
		assert_eq!(mgr.pending_emotion(), None);
		assert_eq!(probe.load_count(), 1);

		// A second gesture does not replay the request.
		mgr.user_gesture();
		assert_eq!(probe.load_count(), 1);
	}

	#[test]
	fn mute_ramps_to_silence_and_back_without_stopping() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 0.6);

		mgr.set_emotion(Emotion::Neutral);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);

		mgr.set_muted(true);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);
		assert!(mgr.current_volume() < 1e-9);
		assert!(probe.track(0).borrow().playing, "position preserved");

		mgr.set_muted(false);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);
		assert!((mgr.current_volume() - 0.6).abs() < 1e-9);
	}

	#[test]
	fn set_volume_clamps_and_retargets() {
		let backend = MockBackend::unlocked_backend();
		let mut mgr = AmbientAudioManager::new(backend, 0.5);

		mgr.set_emotion(Emotion::Happy);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);

		mgr.set_volume(2.5);
		mgr.tick(DT);
		assert!((mgr.current_volume() - 1.0).abs() < 1e-9);

		mgr.set_volume(-1.0);
		mgr.tick(DT);
		assert!(mgr.current_volume() < 1e-9);
	}

	#[test]
	fn stop_fades_out_and_returns_to_idle() {
		let backend = MockBackend::unlocked_backend();
		let probe = backend.clone();
		let mut mgr = AmbientAudioManager::new(backend, 0.9);

		mgr.set_emotion(Emotion::Sad);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);

		mgr.stop();
		assert_eq!(mgr.state(), AmbientState::FadingOut);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.2);

		assert_eq!(mgr.state(), AmbientState::Idle);
		assert_eq!(mgr.current_emotion(), None);
		assert!(probe.track(0).borrow().released);
		assert!(!mgr.is_active());
	}

	#[test]
	fn set_volume_ignores_track_mid_fade_out() {
		let backend = MockBackend::unlocked_backend();
		let mut mgr = AmbientAudioManager::new(backend, 0.4);

		mgr.set_emotion(Emotion::Happy);
		run_ticks(&mut mgr, CROSSFADE_SECS + 0.1);

		mgr.stop();
		run_ticks(&mut mgr, 0.5);
		let mid_fade = mgr.current_volume();
		assert!(mid_fade > 0.0 && mid_fade < 0.4);

		// Raising the target must not push the dying track back up.
		mgr.set_volume(1.0);
		mgr.tick(DT);
		assert!(mgr.current_volume() < mid_fade);
	}

	#[test]
	fn missing_track_degrades_silently() {
		let backend = MockBackend::unlocked_backend();
		*backend.available.borrow_mut() = false;
		let mut mgr = AmbientAudioManager::new(backend, 0.5);

		mgr.set_emotion(Emotion::Happy);
		assert_eq!(mgr.state(), AmbientState::Idle);
		mgr.tick(DT); // nothing to advance, nothing panics
	}
}
