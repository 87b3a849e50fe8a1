//! Mood ownership and fan-out gating.
//!
//! The controller is the only writer of the current mood. A mood change is
//! accepted only when no transition is in flight and the mood actually
//! differs; accepted changes lock the controller for the transition duration
//! (matching the audio crossfade) so transitions never stack.
//!
//! Theme/DOM side effects go through the [`MoodSink`] trait: the browser
//! build writes a `data-mood` attribute and dispatches `emotionChanged` /
//! `moodThemeChanged` custom events, while tests record calls.

use log::debug;
use wasm_bindgen::JsValue;

use super::emotion::Emotion;

/// Transition lock duration in seconds; matches the ambient crossfade.
pub const TRANSITION_SECS: f64 = 2.0;

/// Downstream receiver for accepted mood changes.
pub trait MoodSink {
	/// Synchronously reflect the new mood on the page theme.
	fn apply_theme(&mut self, mood: Emotion);
	/// Notify external listeners that the mood changed.
	fn announce(&mut self, from: Emotion, to: Emotion);
}

/// Single owner of `current_mood` and the transition lock.
pub struct MoodThemeController {
	current: Emotion,
	previous: Emotion,
	transitioning: bool,
	transition_left: f64,
}

impl MoodThemeController {
	pub fn new(initial: Emotion) -> Self {
		Self {
			current: initial,
			previous: initial,
			transitioning: false,
			transition_left: 0.0,
		}
	}

	pub fn current(&self) -> Emotion {
		self.current
	}

	/// Mood before the current/most recent transition.
	pub fn previous(&self) -> Emotion {
		self.previous
	}

	pub fn is_transitioning(&self) -> bool {
		self.transitioning
	}

	/// Progress of the current transition in [0, 1]; 1 when settled.
	pub fn blend(&self) -> f64 {
		if self.transitioning {
			1.0 - (self.transition_left / TRANSITION_SECS).clamp(0.0, 1.0)
		} else {
			1.0
		}
	}

	/// Attempt a mood change. Returns the `(from, to)` pair to fan out, or
	/// `None` when the request is dropped (same mood, or a transition is
	/// already in flight).
	pub fn begin(&mut self, new_mood: Emotion) -> Option<(Emotion, Emotion)> {
		if self.transitioning {
			debug!("mood change to {} dropped: transition in flight", new_mood.tag());
			return None;
		}
		if new_mood == self.current {
			return None;
		}
		let from = self.current;
		self.previous = from;
		self.current = new_mood;
		self.transitioning = true;
		self.transition_left = TRANSITION_SECS;
		Some((from, new_mood))
	}

	/// Count down the transition lock.
	pub fn tick(&mut self, dt: f64) {
		if self.transitioning {
			self.transition_left -= dt;
			if self.transition_left <= 0.0 {
				self.transitioning = false;
				self.transition_left = 0.0;
			}
		}
	}

	/// Teardown: back to neutral with no transition pending.
	pub fn reset(&mut self) {
		self.current = Emotion::Neutral;
		self.previous = Emotion::Neutral;
		self.transitioning = false;
		self.transition_left = 0.0;
	}
}

impl Default for MoodThemeController {
	fn default() -> Self {
		Self::new(Emotion::Neutral)
	}
}

/// Browser sink: theme attribute on the document element plus window-level
/// custom events. Every DOM failure degrades to a no-op.
pub struct DomMoodSink;

impl DomMoodSink {
	fn dispatch(name: &str, detail: &JsValue) {
		let Some(window) = web_sys::window() else {
			return;
		};
		let init = web_sys::CustomEventInit::new();
		init.set_detail(detail);
		if let Ok(event) = web_sys::CustomEvent::new_with_event_init_dict(name, &init) {
			let _ = window.dispatch_event(&event);
		}
	}
}

impl MoodSink for DomMoodSink {
	fn apply_theme(&mut self, mood: Emotion) {
		let root = web_sys::window()
			.and_then(|w| w.document())
			.and_then(|d| d.document_element());
		if let Some(root) = root {
			let _ = root.set_attribute("data-mood", mood.tag());
		}
	}

	fn announce(&mut self, from: Emotion, to: Emotion) {
		Self::dispatch("emotionChanged", &JsValue::from_str(to.tag()));

		let detail = js_sys::Object::new();
		let _ = js_sys::Reflect::set(
			&detail,
			&JsValue::from_str("from"),
			&JsValue::from_str(from.tag()),
		);
		let _ = js_sys::Reflect::set(
			&detail,
			&JsValue::from_str("to"),
			&JsValue::from_str(to.tag()),
		);
		Self::dispatch("moodThemeChanged", &detail.into());
	}
}

#[cfg(test)]
pub(crate) mod testing {
	//! Recording sink shared by controller and scene tests.

	use super::{Emotion, MoodSink};

	#[derive(Default)]
	pub struct RecordingSink {
		pub themes: Vec<Emotion>,
		pub announcements: Vec<(Emotion, Emotion)>,
	}

	impl MoodSink for RecordingSink {
		fn apply_theme(&mut self, mood: Emotion) {
			self.themes.push(mood);
		}

		fn announce(&mut self, from: Emotion, to: Emotion) {
			self.announcements.push((from, to));
		}
	}
}
