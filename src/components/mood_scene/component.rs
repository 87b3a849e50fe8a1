//! Leptos component wrapping the mood scene canvas.
//!
//! The component creates a fullscreen canvas, builds the scene from the page
//! configuration, and wires window-level listeners: classifier events,
//! control events, resize, and the gesture that unlocks audio. The animation
//! loop runs via `requestAnimationFrame` but self-suspends whenever the scene
//! reports nothing left to animate; every entry point that could wake the
//! scene reschedules it.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, CustomEvent, HtmlCanvasElement, MouseEvent};

use super::audio::{AmbientAudioManager, WebAudioBackend};
use super::controller::DomMoodSink;
use super::cues::TransitionSoundManager;
use super::render;
use super::state::MoodScene;
use super::types::SceneConfig;

type WebScene = MoodScene<WebAudioBackend, DomMoodSink>;

/// Scene plus the canvas resources the animation loop needs.
struct SceneContext {
	scene: WebScene,
	ctx: CanvasRenderingContext2d,
	canvas: HtmlCanvasElement,
	running: bool,
}

type SharedContext = Rc<RefCell<Option<SceneContext>>>;
type AnimateCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Asserts that a value may cross thread boundaries.
///
/// `on_cleanup` requires its closure to be `Send + Sync`, but the scene state
/// is an `Rc<RefCell<…>>` graph that is neither. The crate targets CSR/WASM,
/// which is single-threaded, so the wrapped value never actually moves between
/// threads; this wrapper only satisfies the compiler-dictated bound.
struct AssertThreadSafe<T>(T);

// SAFETY: the WASM presentation layer runs on a single thread; these values are
// created and dropped on that same thread and never shared across threads.
unsafe impl<T> Send for AssertThreadSafe<T> {}
unsafe impl<T> Sync for AssertThreadSafe<T> {}

/// A window listener kept alive until component cleanup.
enum Listener {
	Plain(Closure<dyn FnMut()>),
	Custom(Closure<dyn FnMut(CustomEvent)>),
	Pointer(Closure<dyn FnMut(MouseEvent)>),
}

impl Listener {
	fn function(&self) -> &js_sys::Function {
		match self {
			Listener::Plain(cb) => cb.as_ref().unchecked_ref(),
			Listener::Custom(cb) => cb.as_ref().unchecked_ref(),
			Listener::Pointer(cb) => cb.as_ref().unchecked_ref(),
		}
	}
}

/// Request a frame if the scene woke up while the loop was suspended.
fn schedule_frame(context: &SharedContext, animate: &AnimateCallback) {
	let mut wake = false;
	if let Some(ref mut c) = *context.borrow_mut() {
		if !c.running && c.scene.needs_frame() {
			c.running = true;
			wake = true;
		}
	}
	if wake {
		request_frame(animate);
	}
}

fn request_frame(animate: &AnimateCallback) {
	if let Some(ref cb) = *animate.borrow() {
		if let Some(window) = web_sys::window() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}
}

/// Renders the cosmic mood scene on a fullscreen canvas.
///
/// The surrounding page drives it entirely through window events
/// (`emotionDetected`, `mashaaer:set-volume`, `mashaaer:mute`,
/// `mashaaer:stop`) and observes it through `emotionChanged` /
/// `moodThemeChanged` plus the `data-mood` attribute on the document element.
#[component]
pub fn MoodSceneCanvas(config: SceneConfig) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: AnimateCallback = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Vec<(&'static str, Listener)>>> = Rc::new(RefCell::new(Vec::new()));
	let (context_init, animate_init, listeners_init) =
		(context.clone(), animate.clone(), listeners.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = (
			window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
			window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
		);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		// No 2d context means no visuals; the page itself keeps working.
		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|obj| obj.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				warn!("mood scene: 2d canvas context unavailable, scene disabled");
				return;
			}
		};

		let audio = AmbientAudioManager::new(
			WebAudioBackend::new(config.sound_base.clone()),
			config.volume,
		);
		let cues = TransitionSoundManager::new(
			WebAudioBackend::new(config.sound_base.clone()),
			config.cue_volume,
		);
		let mut scene = MoodScene::new(
			w,
			h,
			config.star_count,
			config.particles_enabled,
			audio,
			cues,
			DomMoodSink,
		);
		scene.set_muted(config.muted);
		scene.set_mood_tag(&config.start_mood);

		*context_init.borrow_mut() = Some(SceneContext {
			scene,
			ctx,
			canvas,
			running: false,
		});

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let mut keep_going = false;
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let dt = 0.016;
				if let Some((nw, nh)) = c.scene.tick(dt) {
					c.canvas.set_width(nw as u32);
					c.canvas.set_height(nh as u32);
				}
				let (cw, ch) = (c.canvas.width() as f64, c.canvas.height() as f64);
				let ctl = c.scene.controller();
				render::render(
					&c.ctx,
					cw,
					ch,
					c.scene.stars(),
					c.scene.field(),
					ctl.previous(),
					ctl.current(),
					ctl.blend(),
				);
				keep_going = c.scene.needs_frame();
				c.running = keep_going;
			}
			if keep_going {
				request_frame(&animate_inner);
			}
		}));

		let listen = |name: &'static str, listener: Listener| {
			let _ = window.add_event_listener_with_callback(name, listener.function());
			listeners_init.borrow_mut().push((name, listener));
		};

		let (context_rs, animate_rs) = (context_init.clone(), animate_init.clone());
		listen(
			"resize",
			Listener::Plain(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = (
					win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
					win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
				);
				if let Some(ref mut c) = *context_rs.borrow_mut() {
					c.scene.request_resize(nw, nh);
				}
				schedule_frame(&context_rs, &animate_rs);
			})),
		);

		let (context_em, animate_em) = (context_init.clone(), animate_init.clone());
		listen(
			"emotionDetected",
			Listener::Custom(Closure::new(move |ev: CustomEvent| {
				let detail = ev.detail();
				// Accept both a bare tag string and { emotion: "tag", ... }.
				let tag = detail.as_string().or_else(|| {
					js_sys::Reflect::get(&detail, &JsValue::from_str("emotion"))
						.ok()
						.and_then(|v| v.as_string())
				});
				match tag {
					Some(tag) => {
						if let Some(ref mut c) = *context_em.borrow_mut() {
							c.scene.set_mood_tag(&tag);
						}
						schedule_frame(&context_em, &animate_em);
					}
					None => warn!("emotionDetected event without a usable detail"),
				}
			})),
		);

		let (context_vol, animate_vol) = (context_init.clone(), animate_init.clone());
		listen(
			"mashaaer:set-volume",
			Listener::Custom(Closure::new(move |ev: CustomEvent| {
				if let Some(v) = ev.detail().as_f64() {
					if let Some(ref mut c) = *context_vol.borrow_mut() {
						c.scene.set_volume(v);
					}
					schedule_frame(&context_vol, &animate_vol);
				}
			})),
		);

		let (context_mute, animate_mute) = (context_init.clone(), animate_init.clone());
		listen(
			"mashaaer:mute",
			Listener::Custom(Closure::new(move |ev: CustomEvent| {
				if let Some(flag) = ev.detail().as_bool() {
					if let Some(ref mut c) = *context_mute.borrow_mut() {
						c.scene.set_muted(flag);
					}
					schedule_frame(&context_mute, &animate_mute);
				}
			})),
		);

		let (context_stop, animate_stop) = (context_init.clone(), animate_init.clone());
		listen(
			"mashaaer:stop",
			Listener::Plain(Closure::new(move || {
				if let Some(ref mut c) = *context_stop.borrow_mut() {
					c.scene.stop_audio();
				}
				schedule_frame(&context_stop, &animate_stop);
			})),
		);

		// Either gesture unlocks autoplay and retries a queued mood track.
		// Taps additionally sparkle in the current mood's style.
		let (context_pd, animate_pd) = (context_init.clone(), animate_init.clone());
		listen(
			"pointerdown",
			Listener::Pointer(Closure::new(move |ev: MouseEvent| {
				if let Some(ref mut c) = *context_pd.borrow_mut() {
					c.scene.user_gesture();
					c.scene.sparkle_at(ev.client_x() as f64, ev.client_y() as f64);
				}
				schedule_frame(&context_pd, &animate_pd);
			})),
		);

		let (context_kd, animate_kd) = (context_init.clone(), animate_init.clone());
		listen(
			"keydown",
			Listener::Plain(Closure::new(move || {
				if let Some(ref mut c) = *context_kd.borrow_mut() {
					c.scene.user_gesture();
				}
				schedule_frame(&context_kd, &animate_kd);
			})),
		);

		// Paint the initial sky even when the scene starts idle.
		if let Some(ref mut c) = *context_init.borrow_mut() {
			c.running = true;
		}
		request_frame(&animate_init);
	});

	let cleanup_state =
		AssertThreadSafe((context.clone(), animate.clone(), listeners.clone()));
	on_cleanup(move || {
		// Bind the whole wrapper so the closure captures `AssertThreadSafe`
		// itself, not its inner `!Send` fields (edition 2024 captures fields
		// disjointly otherwise).
		let cleanup_state = &cleanup_state;
		let (context_cleanup, animate_cleanup, listeners_cleanup) = &cleanup_state.0;
		if let Some(window) = web_sys::window() {
			for (name, listener) in listeners_cleanup.borrow_mut().drain(..) {
				let _ = window.remove_event_listener_with_callback(name, listener.function());
			}
		}
		if let Some(ref mut c) = *context_cleanup.borrow_mut() {
			c.scene.shutdown();
			c.running = false;
		}
		*context_cleanup.borrow_mut() = None;
		*animate_cleanup.borrow_mut() = None;
	});

	view! {
		<canvas
			node_ref=canvas_ref
			class="mood-scene-canvas"
			style="position: fixed; inset: 0; display: block; z-index: -1;"
		/>
	}
}
