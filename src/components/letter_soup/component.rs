//! Leptos component wiring the letter soup into the page.
//!
//! The component creates a full-viewport container, mounts the rendering
//! surface, and wires pointer/touch handlers on the container plus keyboard,
//! device-motion and resize listeners on the window. An animation loop runs
//! via `requestAnimationFrame`, ticking the [`AnimationContext`] and drawing
//! each frame.

use std::cell::RefCell;
use std::rc::Rc;

use fastrand::Rng;
use js_sys::{Function, Promise, Reflect};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{DeviceMotionEvent, HtmlElement, KeyboardEvent, MouseEvent, TouchEvent, Window};

use super::config::SoupSettings;
use super::context::AnimationContext;
use super::input::{Acceleration, MotionAccess};
use super::quotes::{QuoteSource, fetch_quotes};
use super::render::SoupSurface;

/// Bundles animation state with the DOM nodes it draws into.
struct SoupContext {
	anim: AnimationContext,
	surface: SoupSurface,
}

type Shared = Rc<RefCell<Option<SoupContext>>>;
type MotionListener = Rc<RefCell<Option<Closure<dyn FnMut(DeviceMotionEvent)>>>>;

fn viewport_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

/// True when motion events sit behind an explicit async permission prompt.
fn motion_permission_gated(window: &Window) -> bool {
	Reflect::get(window, &JsValue::from_str("DeviceMotionEvent"))
		.ok()
		.filter(|api| !api.is_undefined())
		.and_then(|api| Reflect::get(&api, &JsValue::from_str("requestPermission")).ok())
		.is_some_and(|request| request.is_function())
}

async fn request_motion_permission() -> Result<bool, JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let api = Reflect::get(&window, &JsValue::from_str("DeviceMotionEvent"))?;
	let request: Function = Reflect::get(&api, &JsValue::from_str("requestPermission"))?.dyn_into()?;
	let promise: Promise = request.call0(&api)?.dyn_into()?;
	let state = JsFuture::from(promise).await?;
	info!("letter-soup: motion permission {:?}", state.as_string());
	Ok(state.as_string().as_deref() == Some("granted"))
}

fn attach_motion_listener(window: &Window, context: &Shared, listener: &MotionListener) {
	let context_motion = context.clone();
	*listener.borrow_mut() = Some(Closure::new(move |ev: DeviceMotionEvent| {
		let accel = ev
			.acceleration()
			.or_else(|| ev.acceleration_including_gravity())
			.map(|a| Acceleration {
				x: a.x(),
				y: a.y(),
				z: a.z(),
			});
		if let Some(ref mut c) = *context_motion.borrow_mut() {
			c.anim.input.device_motion(accel, now_ms());
		}
	}));
	if let Some(ref cb) = *listener.borrow() {
		let _ = window.add_event_listener_with_callback("devicemotion", cb.as_ref().unchecked_ref());
	}
}

fn spawn_quote_fetch(settings: &SoupSettings, context: &Shared) {
	let (Some(sheet_id), Some(sheet_name)) = (settings.sheet_id.clone(), settings.sheet_name.clone())
	else {
		return;
	};
	let source = QuoteSource {
		sheet_id,
		sheet_name,
	};
	let context_fetch = context.clone();
	spawn_local(async move {
		match fetch_quotes(&source).await {
			Ok(quotes) => {
				info!("letter-soup: loaded {} quotes", quotes.len());
				if let Some(ref mut c) = *context_fetch.borrow_mut() {
					c.anim.set_quotes(quotes);
				}
			}
			Err(e) => error!("letter-soup: failed to load quotes: {}", e),
		}
	});
}

/// Renders the letter soup over the whole viewport.
///
/// Quotes come from the sheet named in `settings`, falling back to its inline
/// quotes. Until a fetch resolves, clear cycles run without a message.
#[component]
pub fn LetterSoup(#[prop(into)] settings: Signal<SoupSettings>) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let context: Shared = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keydown_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let motion_cb: MotionListener = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init, keydown_cb_init, motion_cb_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		keydown_cb.clone(),
		motion_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(container) = container_ref.get() else {
			return;
		};
		let container: HtmlElement = container.into();
		let Some(window) = web_sys::window() else {
			warn!("letter-soup: no window, not starting");
			return;
		};
		let Some((w, h)) = viewport_size(&window) else {
			warn!("letter-soup: could not read viewport size");
			return;
		};

		let settings = settings.get_untracked();
		let mut anim = AnimationContext::new(w, h, settings.clear_policy(), Rng::new());
		if !settings.quotes.is_empty() {
			anim.set_quotes(settings.quotes.clone());
		}
		let Some(surface) = SoupSurface::mount(container, &anim) else {
			warn!("letter-soup: failed to mount rendering surface");
			return;
		};
		info!(
			"letter-soup: {} letters, policy {}",
			anim.field.len(),
			anim.config.policy.name
		);
		*context_init.borrow_mut() = Some(SoupContext { anim, surface });

		spawn_quote_fetch(&settings, &context_init);

		if motion_permission_gated(&window) {
			if let Some(ref mut c) = *context_init.borrow_mut() {
				c.anim.input.set_motion_access(MotionAccess::AwaitingGesture);
			}
		} else {
			attach_motion_listener(&window, &context_init, &motion_cb_init);
		}

		let context_key = context_init.clone();
		*keydown_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if let Some(ref mut c) = *context_key.borrow_mut() {
				if c.anim.input.key_down(&ev.code()) {
					ev.prevent_default();
				}
			}
		}));
		if let Some(ref cb) = *keydown_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keydown", cb.as_ref().unchecked_ref());
		}

		let context_resize = context_init.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some((nw, nh)) = web_sys::window().as_ref().and_then(viewport_size) else {
				return;
			};
			if let Some(ref mut c) = *context_resize.borrow_mut() {
				c.anim.resize(nw, nh);
				c.surface.resize(&c.anim);
			}
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.anim.tick(now);
				if c.anim.take_message_dirty() {
					c.surface.rebuild_message(&c.anim);
				}
				c.surface.draw(&c.anim);
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let local_point = move |client_x: i32, client_y: i32| -> Option<(f64, f64)> {
		let container: HtmlElement = container_ref.get()?.into();
		let rect = container.get_bounding_client_rect();
		Some((client_x as f64 - rect.left(), client_y as f64 - rect.top()))
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.anim.input.pointer_move(x, y);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.anim.input.pointer_leave();
		}
	};

	let context_click = context.clone();
	let on_click = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some((x, y)) = local_point(ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_click.borrow_mut() {
			c.anim.input.click(x, y);
		}
	};

	let (context_ts, motion_cb_ts) = (context.clone(), motion_cb.clone());
	let on_touchstart = move |_: TouchEvent| {
		let should_request = match *context_ts.borrow_mut() {
			Some(ref mut c) => c.anim.input.begin_motion_request(),
			None => false,
		};
		if !should_request {
			return;
		}
		let (context_perm, motion_perm) = (context_ts.clone(), motion_cb_ts.clone());
		spawn_local(async move {
			let access = match request_motion_permission().await {
				Ok(true) => MotionAccess::Granted,
				Ok(false) => {
					warn!("letter-soup: motion permission not granted");
					MotionAccess::Denied
				}
				Err(e) => {
					error!("letter-soup: motion permission error: {:?}", e);
					MotionAccess::Denied
				}
			};
			if let Some(ref mut c) = *context_perm.borrow_mut() {
				c.anim.input.set_motion_access(access);
			}
			if access == MotionAccess::Granted {
				if let Some(window) = web_sys::window() {
					attach_motion_listener(&window, &context_perm, &motion_perm);
				}
			}
		});
	};

	let context_tm = context.clone();
	let on_touchmove = move |ev: TouchEvent| {
		let touch = ev
			.touches()
			.get(0)
			.and_then(|t| local_point(t.client_x(), t.client_y()));
		if let Some(ref mut c) = *context_tm.borrow_mut() {
			c.anim.input.touch_move(touch);
		}
	};

	let context_te = context.clone();
	let on_touchend = move |_: TouchEvent| {
		if let Some(ref mut c) = *context_te.borrow_mut() {
			c.anim.input.touch_end();
		}
	};

	view! {
		<div
			node_ref=container_ref
			class="soup-container"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:click=on_click
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			style="position: fixed; top: 0; left: 0; overflow: hidden;"
		/>
	}
}
