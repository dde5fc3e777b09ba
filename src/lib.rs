//! letter-soup: an animated letter soup background for the web.
//!
//! This crate provides a WASM-based component that renders drifting letter
//! glyphs which scatter around the cursor and part around a clear zone to
//! reveal a quote.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::letter_soup::{AnimationContext, ClearPolicy, LetterSoup, SoupSettings};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("letter-soup: logging initialized");
}

/// Load settings from a script element with id="soup-config".
/// Expected format: JSON with optional `sheet_id`, `sheet_name`, `quotes`, `policy`.
fn load_settings() -> Option<SoupSettings> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("soup-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<SoupSettings>(&json_text) {
		Ok(settings) => {
			info!(
				"letter-soup: loaded settings ({} inline quotes, sheet: {})",
				settings.quotes.len(),
				settings.sheet_id.is_some()
			);
			Some(settings)
		}
		Err(e) => {
			warn!("letter-soup: failed to parse settings: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads settings from the DOM and renders the letter soup.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let settings = load_settings().unwrap_or_default();
	let settings_signal = Signal::derive(move || settings.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Letter Soup" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<LetterSoup settings=settings_signal />
	}
}
