//! mashaaer-fx: emotion-driven cosmic visuals and audio for Mashaaer.
//!
//! This crate provides the WASM presentation layer of the Mashaaer companion:
//! a canvas scene (stars, meteors, emotion particles) plus ambient-audio
//! crossfades and mood-theme propagation, reacting to emotion tags emitted by
//! the page's classifier.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::mood_scene::{Emotion, Lang, MoodSceneCanvas, SceneConfig};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mashaaer-fx: logging initialized");
}

/// Load scene configuration from a script element with id="mashaaer-config".
/// Expected format: JSON matching [`SceneConfig`]; a missing or malformed
/// document falls back to the defaults.
fn load_scene_config() -> Option<SceneConfig> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("mashaaer-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<SceneConfig>(&json_text) {
		Ok(config) => {
			info!(
				"mashaaer-fx: config loaded (lang {}, start mood {})",
				config.lang.code(),
				config.start_mood
			);
			Some(config)
		}
		Err(e) => {
			warn!("mashaaer-fx: failed to parse config, using defaults: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads configuration from the DOM and mounts the cosmic mood scene with a
/// localized greeting overlay.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_scene_config().unwrap_or_default();
	let greeting = config.greeting_text();
	let lang = config.lang;

	view! {
		<Html attr:lang=lang.code() attr:dir=lang.dir() attr:data-mood="neutral" />
		<Title text="Mashaaer" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="cosmic-stage">
			<MoodSceneCanvas config=config />
			<div class="scene-overlay">
				<h1>{greeting}</h1>
			</div>
		</div>
	}
}
