//! Emotion-driven cosmic scene component.
//!
//! Renders the Mashaaer mood atmosphere on an HTML canvas with:
//! - A twinkling star/meteor background layer
//! - Emotion particle bursts styled from a static per-emotion table
//! - Ambient mood audio with gapless crossfades on emotion change
//! - Debounced one-shot transition cues
//! - Mood-theme propagation to the page (`data-mood` attribute plus
//!   `emotionChanged` / `moodThemeChanged` custom events)
//!
//! The scene is driven by `emotionDetected` events from the page's emotion
//! classifier; all mutation funnels through [`state::MoodScene`] on a
//! self-suspending `requestAnimationFrame` loop.

mod audio;
mod component;
mod controller;
mod cosmos;
mod cues;
pub mod emotion;
mod particles;
mod render;
mod state;
pub mod style;
mod types;

pub use audio::{AmbientAudioManager, AmbientState, AudioBackend, AudioHandle, WebAudioBackend};
pub use component::MoodSceneCanvas;
pub use controller::{DomMoodSink, MoodSink, MoodThemeController};
pub use cues::TransitionSoundManager;
pub use emotion::Emotion;
pub use state::MoodScene;
pub use style::{EmotionStyle, style_for};
pub use types::{Lang, SceneConfig};
