//! Explicit animation context and the per-frame driver.
//!
//! Every piece of mutable animation state lives in [`AnimationContext`]. Host
//! event handlers write into its [`InputBridge`]; the frame callback calls
//! [`AnimationContext::tick`] once per display refresh and is the only code
//! that integrates state.

use fastrand::Rng;
use log::debug;

use super::clear_zone::ClearZone;
use super::config::{ClearPolicy, SoupConfig};
use super::input::{InputBridge, TriggerKind, TriggerRequest};
use super::message::Message;
use super::particles::ParticleField;
use super::quotes::QuoteBook;
use super::targets::generate_targets;

/// All state for one letter-soup surface.
pub struct AnimationContext {
	/// Viewport-resolved configuration.
	pub config: SoupConfig,
	/// Background letters.
	pub field: ParticleField,
	/// Clear-zone state machine.
	pub zone: ClearZone,
	/// Input recorded by event handlers.
	pub input: InputBridge,
	/// The revealed quote.
	pub message: Message,
	/// Loaded quotes.
	pub quotes: QuoteBook,
	rng: Rng,
	/// Set when the message box needs re-sizing before the next draw.
	message_dirty: bool,
}

impl AnimationContext {
	/// Build a context for a `width` x `height` viewport.
	pub fn new(width: f64, height: f64, policy: ClearPolicy, mut rng: Rng) -> Self {
		let config = SoupConfig::resolve(width, height, policy);
		let targets = generate_targets(&mut rng, width, height, config.particle_count);
		let field = ParticleField::new(&mut rng, &targets, config.drift);
		let zone = ClearZone::new(config.policy.clone(), config.max_radius);
		let input = InputBridge::new(config.policy.triggers, config.shake);
		let message = Message::new(config.policy.clone(), config.quote_drift, config.glyph);

		Self {
			config,
			field,
			zone,
			input,
			message,
			quotes: QuoteBook::default(),
			rng,
			message_dirty: false,
		}
	}

	/// Replace the loaded quotes once the source resolves.
	pub fn set_quotes(&mut self, quotes: Vec<String>) {
		self.quotes = QuoteBook::new(quotes);
	}

	/// Start a clear cycle at time `now`.
	pub fn trigger(&mut self, request: TriggerRequest, now: f64) {
		let center = match (request.kind, request.point) {
			(TriggerKind::Click, Some((x, y))) => self.config.clamp_center(x, y),
			_ => self.config.viewport_center(),
		};
		let cycle = self.zone.trigger(center, now);

		let quote = self.quotes.random(&mut self.rng);
		debug!(
			"letter-soup: clear cycle {} ({:?}) at ({:.0}, {:.0}), quote: {}",
			cycle,
			request.kind,
			center.0,
			center.1,
			quote.is_some()
		);
		self.message
			.show(&mut self.rng, quote, now, self.config.max_radius * 2.0);
		self.message_dirty = true;
	}

	/// Advance every component to time `now` (ms).
	pub fn tick(&mut self, now: f64) {
		if let Some(request) = self.input.take_trigger() {
			self.trigger(request, now);
		}

		self.zone.update(now);
		self.field
			.apply_cursor_repulsion(self.input.cursor(), &self.config.cursor);

		let zone = &self.zone;
		self.field
			.step(now, zone.is_active(), |rest| zone.destination(rest));

		self.message.update(now);
	}

	/// Returns true once after each trigger, when the message box must be rebuilt.
	pub fn take_message_dirty(&mut self) -> bool {
		std::mem::take(&mut self.message_dirty)
	}

	/// Re-resolve the configuration for a new viewport.
	///
	/// Empty viewports (a minimized window) are ignored so rest positions are
	/// never collapsed onto an edge. A cycle in flight keeps running with its
	/// center clamped to the new bounds.
	pub fn resize(&mut self, width: f64, height: f64) {
		if !(width > 0.0 && height > 0.0) {
			debug!("letter-soup: ignoring resize to {width}x{height}");
			return;
		}
		let old = (self.config.width, self.config.height);
		self.config = self.config.resized(width, height);
		self.field.resize(old, (width, height));
		self.zone.set_max_radius(self.config.max_radius);

		let (cx, cy) = self.zone.center();
		self.zone.recenter(self.config.clamp_center(cx, cy));
		if self.message.is_visible() {
			self.message.set_diameter(self.config.max_radius * 2.0);
			self.message_dirty = true;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::letter_soup::clear_zone::{ClearPhase, ease_out6};

	fn context() -> AnimationContext {
		AnimationContext::new(1280.0, 800.0, ClearPolicy::slow(), Rng::with_seed(21))
	}

	fn click_request(x: f64, y: f64) -> TriggerRequest {
		TriggerRequest {
			kind: TriggerKind::Click,
			point: Some((x, y)),
		}
	}

	#[test]
	fn test_new_context_matches_config() {
		let ctx = context();
		assert_eq!(ctx.field.len(), ctx.config.particle_count);
		assert_eq!(ctx.zone.phase(), ClearPhase::Idle);
		assert!(!ctx.message.is_visible());
	}

	#[test]
	fn test_click_trigger_is_clamped() {
		let mut ctx = context();
		ctx.input.click(5.0, 790.0);
		ctx.tick(0.0);
		let r = ctx.config.max_radius;
		assert_eq!(ctx.zone.center(), (r, 800.0 - r));
		assert_eq!(ctx.zone.phase(), ClearPhase::Expanding);
		assert!(ctx.take_message_dirty());
		assert!(!ctx.take_message_dirty());
	}

	#[test]
	fn test_shake_uses_viewport_center() {
		let mut ctx = context();
		ctx.trigger(
			TriggerRequest {
				kind: TriggerKind::Shake,
				point: None,
			},
			0.0,
		);
		assert_eq!(ctx.zone.center(), (640.0, 400.0));
	}

	#[test]
	fn test_trigger_without_quotes_shows_nothing() {
		let mut ctx = context();
		ctx.trigger(click_request(640.0, 400.0), 0.0);
		ctx.tick(100.0);
		assert!(!ctx.message.is_visible());
		assert!(ctx.zone.is_active());
	}

	#[test]
	fn test_trigger_with_quotes_shows_message() {
		let mut ctx = context();
		ctx.set_quotes(vec!["the soup parts".into()]);
		ctx.trigger(click_request(640.0, 400.0), 0.0);
		assert!(ctx.message.is_visible());
		assert_eq!(ctx.message.glyphs().len(), 12);
		assert_eq!(ctx.message.diameter(), ctx.config.max_radius * 2.0);
	}

	#[test]
	fn test_end_to_end_cycle() {
		let mut ctx = context();
		ctx.trigger(click_request(640.0, 400.0), 0.0);
		let max = ctx.config.max_radius;

		ctx.tick(1500.0);
		assert!((ctx.zone.radius() - ease_out6(0.5) * max).abs() < 1e-9);
		ctx.tick(3000.0);
		assert_eq!(ctx.zone.radius(), max);
		ctx.tick(4000.0);
		assert!((ctx.zone.radius() - ease_out6(0.5) * max).abs() < 1e-9);
		ctx.tick(5000.0);
		assert_eq!(ctx.zone.radius(), 0.0);
		assert_eq!(ctx.zone.phase(), ClearPhase::Idle);
	}

	#[test]
	fn test_particles_part_around_center() {
		let mut ctx = context();
		ctx.trigger(click_request(640.0, 400.0), 0.0);
		let mut now = 0.0;
		while now < 3000.0 {
			now += 16.0;
			ctx.tick(now);
		}
		let (cx, cy) = ctx.zone.center();
		let radius = ctx.zone.radius();
		for p in &ctx.field.particles {
			let rest_dist = (p.rest_x - cx).hypot(p.rest_y - cy);
			if rest_dist < radius * 0.9 {
				let dist = (p.x - cx).hypot(p.y - cy);
				assert!(dist > radius * 0.8, "particle still inside: {dist} < {radius}");
			}
		}
	}

	#[test]
	fn test_resize_updates_radius_and_positions() {
		let mut ctx = context();
		let before = (ctx.field.particles[0].rest_x, ctx.field.particles[0].rest_y);
		ctx.resize(640.0, 400.0);
		assert_eq!(ctx.config.width, 640.0);
		assert_eq!(ctx.zone.max_radius(), ctx.config.max_radius);
		assert_eq!(ctx.field.len(), ctx.config.particle_count);
		let after = (ctx.field.particles[0].rest_x, ctx.field.particles[0].rest_y);
		assert!((after.0 - before.0 / 2.0).abs() < 1e-9);
		assert!((after.1 - before.1 / 2.0).abs() < 1e-9);
	}

	#[test]
	fn test_resize_through_empty_viewport_keeps_layout() {
		let mut ctx = context();
		let before: Vec<(f64, f64)> = ctx.field.particles.iter().map(|p| (p.rest_x, p.rest_y)).collect();

		ctx.resize(1280.0, 0.0);
		ctx.resize(0.0, 800.0);
		assert_eq!((ctx.config.width, ctx.config.height), (1280.0, 800.0));
		ctx.resize(1280.0, 800.0);

		let after: Vec<(f64, f64)> = ctx.field.particles.iter().map(|p| (p.rest_x, p.rest_y)).collect();
		assert_eq!(before, after);
		assert!(after.iter().any(|&(_, y)| y > 400.0));
	}

	#[test]
	fn test_resize_mid_cycle_reclamps_center() {
		let mut ctx = context();
		ctx.set_quotes(vec!["shrink".into()]);
		ctx.trigger(click_request(1100.0, 600.0), 0.0);
		assert!(ctx.take_message_dirty());

		ctx.resize(800.0, 500.0);
		let r = ctx.config.max_radius;
		let (cx, cy) = ctx.zone.center();
		assert!(cx + r <= 800.0 + 1e-9 && cy + r <= 500.0 + 1e-9);
		assert!(cx - r >= -1e-9 && cy - r >= -1e-9);
		assert_eq!(ctx.message.diameter(), r * 2.0);
		assert!(ctx.take_message_dirty());
		assert!(ctx.zone.is_active());
	}
}
