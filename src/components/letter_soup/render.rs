//! DOM rendering surface for the letter soup.
//!
//! The container holds one image node per background letter, a clear-zone
//! circle and a message box with one image node per quote glyph. Each frame
//! writes only `transform` (and glyph `opacity`). Layout-affecting properties
//! are touched when the message is rebuilt, when it is shown or hidden, and
//! on resize.

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlImageElement};

use super::context::AnimationContext;
use super::message::glyph_asset;
use super::particles::Transform;

/// CSS transform placing an element at `(x, y)` rotated by `rotation` degrees.
pub fn css_transform(t: &Transform) -> String {
	format!(
		"translate({:.2}px, {:.2}px) rotate({:.2}deg)",
		t.x, t.y, t.rotation
	)
}

/// CSS transform for the clear circle: fixed-size element scaled to `radius`.
pub fn circle_transform(center: (f64, f64), radius: f64, max_radius: f64) -> String {
	let scale = if max_radius > 0.0 {
		radius / max_radius
	} else {
		0.0
	};
	format!(
		"translate({:.2}px, {:.2}px) scale({:.4})",
		center.0 - max_radius,
		center.1 - max_radius,
		scale
	)
}

fn set_style(el: &HtmlElement, name: &str, value: &str) {
	let _ = el.style().set_property(name, value);
}

/// Handles to every visual node of one surface.
pub struct SoupSurface {
	document: Document,
	container: HtmlElement,
	letters: Vec<HtmlElement>,
	circle: HtmlElement,
	message_box: HtmlElement,
	/// One slot per message glyph; `None` where the node could not be created.
	glyphs: Vec<Option<HtmlElement>>,
	message_shown: bool,
}

impl SoupSurface {
	/// Create all nodes inside `container` for the particles of `ctx`.
	pub fn mount(container: HtmlElement, ctx: &AnimationContext) -> Option<Self> {
		let document = container.owner_document()?;

		let circle = create_div(&document, "clear-zone")?;
		set_style(&circle, "position", "absolute");
		set_style(&circle, "left", "0");
		set_style(&circle, "top", "0");
		set_style(&circle, "border-radius", "50%");
		set_style(&circle, "pointer-events", "none");
		container.append_child(&circle).ok()?;

		let mut letters = Vec::with_capacity(ctx.field.len());
		for p in &ctx.field.particles {
			let img = create_image(&document, &glyph_asset(p.letter), "", "letter")?;
			container.append_child(&img).ok()?;
			letters.push(img);
		}

		let message_box = create_div(&document, "message-container")?;
		set_style(&message_box, "position", "absolute");
		set_style(&message_box, "left", "0");
		set_style(&message_box, "top", "0");
		set_style(&message_box, "display", "none");
		set_style(&message_box, "pointer-events", "none");
		container.append_child(&message_box).ok()?;

		let mut surface = Self {
			document,
			container,
			letters,
			circle,
			message_box,
			glyphs: Vec::new(),
			message_shown: false,
		};
		surface.resize(ctx);
		Some(surface)
	}

	/// Apply viewport-dependent sizes.
	pub fn resize(&mut self, ctx: &AnimationContext) {
		let diameter = format!("{:.0}px", ctx.config.max_radius * 2.0);
		set_style(&self.circle, "width", &diameter);
		set_style(&self.circle, "height", &diameter);
		set_style(&self.container, "width", &format!("{:.0}px", ctx.config.width));
		set_style(&self.container, "height", &format!("{:.0}px", ctx.config.height));
	}

	/// Rebuild the glyph nodes for a freshly triggered message.
	///
	/// The box is sized once to the full expanded diameter here so the quote
	/// never re-wraps during the animation.
	pub fn rebuild_message(&mut self, ctx: &AnimationContext) {
		self.message_box.set_inner_html("");
		self.glyphs.clear();

		let diameter = format!("{:.0}px", ctx.message.diameter());
		set_style(&self.message_box, "width", &diameter);
		set_style(&self.message_box, "height", &diameter);
		if let Some(quote) = ctx.message.quote() {
			let _ = self.message_box.set_attribute("aria-label", quote);
		}

		let size = format!("{:.0}px", ctx.message.metrics().size);
		for glyph in ctx.message.glyphs() {
			let alt = glyph.character.to_string();
			let img = create_image(
				&self.document,
				&glyph_asset(glyph.character),
				&alt,
				"letter drift-letter",
			)
			.and_then(|img| {
				set_style(&img, "width", &size);
				set_style(&img, "height", &size);
				set_style(&img, "opacity", "0");
				self.message_box.append_child(&img).ok()?;
				Some(img)
			});
			self.glyphs.push(img);
		}
	}

	/// Write the current frame's transforms.
	pub fn draw(&mut self, ctx: &AnimationContext) {
		for (el, t) in self.letters.iter().zip(ctx.field.transforms()) {
			set_style(el, "transform", &css_transform(t));
		}

		set_style(
			&self.circle,
			"transform",
			&circle_transform(ctx.zone.center(), ctx.zone.radius(), ctx.config.max_radius),
		);

		let visible = ctx.message.is_visible();
		if visible != self.message_shown {
			set_style(
				&self.message_box,
				"display",
				if visible { "block" } else { "none" },
			);
			self.message_shown = visible;
		}
		if !visible {
			return;
		}

		let half = ctx.message.diameter() / 2.0;
		let (cx, cy) = ctx.zone.center();
		set_style(
			&self.message_box,
			"transform",
			&format!("translate({:.2}px, {:.2}px)", cx - half, cy - half),
		);

		let glyph_half = ctx.message.metrics().size / 2.0;
		for (el, frame) in live_slots(&self.glyphs, ctx.message.frames()) {
			let placed = Transform {
				x: half + frame.transform.x - glyph_half,
				y: half + frame.transform.y - glyph_half,
				rotation: frame.transform.rotation,
			};
			set_style(el, "transform", &css_transform(&placed));
			set_style(el, "opacity", &format!("{:.3}", frame.opacity));
		}
	}
}

/// Pair each created node with the frame at the same index, skipping gaps.
fn live_slots<'a, N, F>(nodes: &'a [Option<N>], frames: &'a [F]) -> impl Iterator<Item = (&'a N, &'a F)> {
	nodes
		.iter()
		.zip(frames)
		.filter_map(|(node, frame)| Some((node.as_ref()?, frame)))
}

fn create_div(document: &Document, class: &str) -> Option<HtmlElement> {
	let el: HtmlElement = document.create_element("div").ok()?.dyn_into().ok()?;
	el.set_class_name(class);
	Some(el)
}

fn create_image(document: &Document, src: &str, alt: &str, class: &str) -> Option<HtmlElement> {
	let img: HtmlImageElement = document.create_element("img").ok()?.dyn_into().ok()?;
	img.set_src(src);
	img.set_alt(alt);
	img.set_class_name(class);
	let el: HtmlElement = img.into();
	set_style(&el, "position", "absolute");
	set_style(&el, "left", "0");
	set_style(&el, "top", "0");
	Some(el)
}
