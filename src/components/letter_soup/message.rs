//! The quote revealed inside the clear zone.
//!
//! A quote is broken into words and then characters; every character becomes
//! a [`QuoteGlyph`] with its own drift phase and a small baked-in jitter.
//! Glyphs are laid out once per trigger inside a box as wide as the fully
//! expanded clear zone, so the text never re-wraps while the circle breathes.
//!
//! Fades are driven by epoch-scoped tasks: glyphs nearest the block center
//! fade in first, the whole block fades out when contraction begins, and it
//! is hidden once the fade-out completes.

use fastrand::Rng;

use super::config::{ClearPolicy, DriftConfig, GlyphMetrics};
use super::particles::Transform;
use super::schedule::{Epoch, Scheduler};

/// Maximum baked-in positional jitter per axis (px).
const GLYPH_JITTER: f64 = 5.0;
/// Maximum baked-in rotational jitter (degrees).
const GLYPH_ROT_JITTER: f64 = 10.0;

/// Image resource for a character, named by its lowercase form.
///
/// The name is percent-encoded so punctuation such as `?` or `#` stays part
/// of the path.
pub fn glyph_asset(ch: char) -> String {
	let lower: String = ch.to_lowercase().collect();
	format!("images/{}.svg", urlencoding::encode(&lower))
}

/// One character of the displayed quote.
#[derive(Clone, Debug)]
pub struct QuoteGlyph {
	/// Character shown, as typed in the quote.
	pub character: char,
	/// Layout position relative to the message block center.
	pub offset: (f64, f64),
	/// Static rendering jitter.
	pub jitter: Transform,
	/// Drift phase offset (ms).
	pub drift_phase: f64,
	/// Delay after the trigger before this glyph starts fading in (ms).
	pub fade_delay: f64,
	fade_in_start: Option<f64>,
	/// Current opacity in `[0, 1]`.
	pub opacity: f64,
}

/// Per-frame output for one glyph: transform relative to the block center.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphFrame {
	/// Transform relative to the block center.
	pub transform: Transform,
	/// Opacity in `[0, 1]`.
	pub opacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MessageTask {
	FadeIn(usize),
	FadeOut,
	Hide,
}

/// Lay out words greedily into centered lines no wider than `box_width`.
///
/// Returns one offset per character, relative to the block center.
pub fn layout_words(words: &[Vec<char>], box_width: f64, metrics: &GlyphMetrics) -> Vec<(f64, f64)> {
	let word_width = |w: &Vec<char>| w.len() as f64 * metrics.advance;

	let mut lines: Vec<Vec<&Vec<char>>> = Vec::new();
	let mut line_width = 0.0;
	for word in words {
		let w = word_width(word);
		let fits = !lines.is_empty() && line_width + metrics.space + w <= box_width;
		match lines.last_mut() {
			Some(line) if fits => {
				line.push(word);
				line_width += metrics.space + w;
			}
			_ => {
				lines.push(vec![word]);
				line_width = w;
			}
		}
	}

	let line_count = lines.len() as f64;
	let mut offsets = Vec::new();
	for (row, line) in lines.iter().enumerate() {
		let width: f64 =
			line.iter().map(|w| word_width(*w)).sum::<f64>() + metrics.space * (line.len() as f64 - 1.0);
		let y = (row as f64 - (line_count - 1.0) / 2.0) * metrics.line_height;
		let mut x = -width / 2.0;
		for word in line {
			for _ in word.iter() {
				offsets.push((x + metrics.advance / 2.0, y));
				x += metrics.advance;
			}
			x += metrics.space;
		}
	}
	offsets
}

/// Owns the glyphs of the current quote and their fade lifecycle.
pub struct Message {
	quote: Option<String>,
	glyphs: Vec<QuoteGlyph>,
	frames: Vec<GlyphFrame>,
	visible: bool,
	diameter: f64,
	shown_at: f64,
	fade_out_start: Option<f64>,
	tasks: Scheduler<MessageTask>,
	policy: ClearPolicy,
	drift: DriftConfig,
	metrics: GlyphMetrics,
}

impl Message {
	/// Empty, hidden message.
	pub fn new(policy: ClearPolicy, drift: DriftConfig, metrics: GlyphMetrics) -> Self {
		Self {
			quote: None,
			glyphs: Vec::new(),
			frames: Vec::new(),
			visible: false,
			diameter: 0.0,
			shown_at: 0.0,
			fade_out_start: None,
			tasks: Scheduler::new(),
			policy,
			drift,
			metrics,
		}
	}

	/// Text of the current quote, if any.
	pub fn quote(&self) -> Option<&str> {
		self.quote.as_deref()
	}

	/// Glyphs of the current quote in reading order.
	pub fn glyphs(&self) -> &[QuoteGlyph] {
		&self.glyphs
	}

	/// Glyph transforms and opacities from the last [`Message::update`].
	pub fn frames(&self) -> &[GlyphFrame] {
		&self.frames
	}

	/// True from trigger until the fade-out completes.
	pub fn is_visible(&self) -> bool {
		self.visible
	}

	/// Width and height of the message box, fixed per trigger.
	pub fn diameter(&self) -> f64 {
		self.diameter
	}

	/// Resize the message box. Glyph layout is kept until the next trigger.
	pub fn set_diameter(&mut self, diameter: f64) {
		self.diameter = diameter;
	}

	/// Epoch of the current cycle's tasks.
	pub fn epoch(&self) -> Epoch {
		self.tasks.epoch()
	}

	/// Metrics used for layout.
	pub fn metrics(&self) -> &GlyphMetrics {
		&self.metrics
	}

	/// Replace the message for a new clear cycle triggered at `now`.
	///
	/// Any fades still pending from the previous cycle are cancelled. With no
	/// quote the block stays hidden for this cycle.
	pub fn show(&mut self, rng: &mut Rng, quote: Option<&str>, now: f64, diameter: f64) {
		let epoch = self.tasks.begin_epoch();
		self.diameter = diameter;
		self.shown_at = now;
		self.fade_out_start = None;
		self.glyphs.clear();
		self.frames.clear();
		self.quote = quote.map(str::to_owned);

		let Some(quote) = quote else {
			self.visible = false;
			return;
		};

		let words: Vec<Vec<char>> = quote
			.split(' ')
			.filter(|w| !w.is_empty())
			.map(|w| w.chars().collect())
			.collect();
		let offsets = layout_words(&words, diameter, &self.metrics);

		let max_dist = offsets
			.iter()
			.map(|&(x, y)| x.hypot(y))
			.fold(0.0, f64::max);
		let spread = (self.policy.fade_in_window_ms - self.policy.glyph_fade_ms).max(0.0);

		for (character, offset) in words.iter().flatten().copied().zip(offsets) {
			let dist = offset.0.hypot(offset.1);
			let fade_delay = if max_dist > 0.0 {
				dist / max_dist * spread
			} else {
				0.0
			};
			self.glyphs.push(QuoteGlyph {
				character,
				offset,
				jitter: Transform {
					x: (rng.f64() * 2.0 - 1.0) * GLYPH_JITTER,
					y: (rng.f64() * 2.0 - 1.0) * GLYPH_JITTER,
					rotation: (rng.f64() * 2.0 - 1.0) * GLYPH_ROT_JITTER,
				},
				drift_phase: rng.f64() * self.drift.period_ms,
				fade_delay,
				fade_in_start: None,
				opacity: 0.0,
			});
		}

		for (i, glyph) in self.glyphs.iter().enumerate() {
			self.tasks.schedule(epoch, now + glyph.fade_delay, MessageTask::FadeIn(i));
		}
		let fade_out_at = now + self.policy.contract_start_ms();
		self.tasks.schedule(epoch, fade_out_at, MessageTask::FadeOut);
		self.tasks.schedule(
			epoch,
			fade_out_at + self.policy.fade_out_ms,
			MessageTask::Hide,
		);

		self.frames = vec![GlyphFrame::default(); self.glyphs.len()];
		self.visible = true;
	}

	/// Run due fade tasks and recompute glyph transforms for time `now`.
	///
	/// Fades start at their scheduled time, not at the frame that noticed
	/// them, so a late frame does not stretch the schedule.
	pub fn update(&mut self, now: f64) {
		for task in self.tasks.drain_due(now) {
			match task {
				MessageTask::FadeIn(i) => {
					if let Some(glyph) = self.glyphs.get_mut(i) {
						glyph.fade_in_start = Some(self.shown_at + glyph.fade_delay);
					}
				}
				MessageTask::FadeOut => {
					self.fade_out_start = Some(self.shown_at + self.policy.contract_start_ms());
				}
				MessageTask::Hide => self.visible = false,
			}
		}

		if !self.visible {
			return;
		}

		let fade_out = match self.fade_out_start {
			Some(start) if self.policy.fade_out_ms > 0.0 => {
				1.0 - ((now - start) / self.policy.fade_out_ms).clamp(0.0, 1.0)
			}
			Some(_) => 0.0,
			None => 1.0,
		};

		for (glyph, frame) in self.glyphs.iter_mut().zip(self.frames.iter_mut()) {
			let fade_in = match glyph.fade_in_start {
				Some(start) if self.policy.glyph_fade_ms > 0.0 => {
					((now - start) / self.policy.glyph_fade_ms).clamp(0.0, 1.0)
				}
				Some(_) => 1.0,
				None => 0.0,
			};
			glyph.opacity = fade_in * fade_out;

			let (dx, dy, dr) = self.drift.offset(now, glyph.drift_phase);
			*frame = GlyphFrame {
				transform: Transform {
					x: glyph.offset.0 + glyph.jitter.x + dx,
					y: glyph.offset.1 + glyph.jitter.y + dy,
					rotation: glyph.jitter.rotation + dr,
				},
				opacity: glyph.opacity,
			};
		}
	}
}
