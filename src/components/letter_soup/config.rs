//! Viewport-dependent configuration and clear-cycle policies.
//!
//! All tunable constants live here. Values that depend on the viewport are
//! resolved once into a [`SoupConfig`] and only recomputed on an explicit
//! resize, so hot-path math never reads window dimensions directly.
//!
//! # Policies
//!
//! The clear cycle timing is a named [`ClearPolicy`] rather than a single set
//! of constants:
//!
//! - [`ClearPolicy::classic`]: 2s expand, 1s contract, key + click + shake.
//! - [`ClearPolicy::slow`]: 3s expand, 2s contract, click + shake.
//!
//! A non-zero [`ClearPolicy::hold_ms`] inserts a Holding phase between
//! expansion and contraction.

use serde::Deserialize;

/// Base number of background letters on wide viewports.
pub const BASE_PARTICLE_COUNT: usize = 600;
/// Viewports narrower than this get half the letters and a larger clear ratio.
pub const NARROW_WIDTH: f64 = 1024.0;
/// Clear radius as a fraction of the smaller viewport side on wide viewports.
pub const WIDE_RADIUS_RATIO: f64 = 0.3;
/// Clear radius ratio on narrow viewports.
pub const NARROW_RADIUS_RATIO: f64 = 0.4;

/// Maximum per-axis offset between a letter's spawn position and its rest position.
pub const SPAWN_JITTER: f64 = 5.0;
/// Per-frame velocity damping factor.
pub const VELOCITY_DAMPING: f64 = 0.8;
/// Position lerp factor while no clear cycle is active.
pub const IDLE_LERP: f64 = 0.05;
/// Position lerp factor while a clear cycle is active.
pub const CLEARING_LERP: f64 = 0.2;

/// Which host signals may start a clear cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerSources {
	/// The designated key (space bar).
	pub key: bool,
	/// Primary click or tap, using its coordinates as the clear center.
	pub click: bool,
	/// Device shake.
	pub shake: bool,
}

/// Timing and trigger policy for one clear cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ClearPolicy {
	/// Preset name, as accepted by [`ClearPolicy::by_name`].
	pub name: &'static str,
	/// Duration of the Expanding phase (ms).
	pub expand_ms: f64,
	/// Duration of the Holding phase (ms). Zero skips the phase.
	pub hold_ms: f64,
	/// Duration of the Contracting phase (ms).
	pub contract_ms: f64,
	/// Duration of a single glyph's fade-in (ms).
	pub glyph_fade_ms: f64,
	/// All glyphs reach full opacity within this window after a trigger (ms).
	pub fade_in_window_ms: f64,
	/// Duration of the message fade-out (ms).
	pub fade_out_ms: f64,
	/// Signals allowed to start a cycle.
	pub triggers: TriggerSources,
}

impl ClearPolicy {
	/// Quick reveal: spacebar, tap and shake all trigger.
	pub fn classic() -> Self {
		Self {
			name: "classic",
			expand_ms: 2000.0,
			hold_ms: 0.0,
			contract_ms: 1000.0,
			glyph_fade_ms: 500.0,
			fade_in_window_ms: 1500.0,
			fade_out_ms: 1000.0,
			triggers: TriggerSources {
				key: true,
				click: true,
				shake: true,
			},
		}
	}

	/// Slower, click-centered reveal.
	pub fn slow() -> Self {
		Self {
			name: "slow",
			expand_ms: 3000.0,
			hold_ms: 0.0,
			contract_ms: 2000.0,
			glyph_fade_ms: 500.0,
			fade_in_window_ms: 1500.0,
			fade_out_ms: 2000.0,
			triggers: TriggerSources {
				key: false,
				click: true,
				shake: true,
			},
		}
	}

	/// Look up a preset by name, falling back to [`ClearPolicy::classic`].
	pub fn by_name(name: &str) -> Self {
		match name {
			"slow" => Self::slow(),
			_ => Self::classic(),
		}
	}

	/// Time from trigger until contraction begins (ms).
	pub fn contract_start_ms(&self) -> f64 {
		self.expand_ms + self.hold_ms
	}

	/// Total length of a cycle (ms).
	pub fn cycle_ms(&self) -> f64 {
		self.contract_start_ms() + self.contract_ms
	}
}

impl Default for ClearPolicy {
	fn default() -> Self {
		Self::classic()
	}
}

/// Periodic render-only wobble.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftConfig {
	/// Maximum positional offset (px).
	pub amplitude: f64,
	/// Maximum rotational offset (degrees).
	pub rotation: f64,
	/// Length of one drift cycle (ms).
	pub period_ms: f64,
}

impl DriftConfig {
	/// Drift applied to background letters.
	pub const BACKGROUND: Self = Self {
		amplitude: 10.0,
		rotation: 5.0,
		period_ms: 10_000.0,
	};

	/// Drift applied to quote glyphs.
	pub const QUOTE: Self = Self {
		amplitude: 5.0,
		rotation: 10.0,
		period_ms: 10_000.0,
	};

	/// Offset `(dx, dy, rotation)` at time `now` for an element with the given phase.
	pub fn offset(&self, now: f64, phase: f64) -> (f64, f64, f64) {
		if self.period_ms <= 0.0 {
			return (0.0, 0.0, 0.0);
		}
		let angle = (now + phase).rem_euclid(self.period_ms) / self.period_ms * std::f64::consts::TAU;
		let (sin, cos) = angle.sin_cos();
		(self.amplitude * sin, self.amplitude * cos, self.rotation * sin)
	}
}

/// Cursor repulsion parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorConfig {
	/// Distance (px) beyond which the cursor has no effect.
	pub radius: f64,
	/// Impulse at distance zero.
	pub strength: f64,
}

impl Default for CursorConfig {
	fn default() -> Self {
		Self {
			radius: 150.0,
			strength: 0.8,
		}
	}
}

/// Device-shake detection parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShakeConfig {
	/// Minimum frame-to-frame acceleration delta magnitude.
	pub threshold: f64,
	/// Minimum time between accepted shakes (ms).
	pub cooldown_ms: f64,
}

impl Default for ShakeConfig {
	fn default() -> Self {
		Self {
			threshold: 3.0,
			cooldown_ms: 1000.0,
		}
	}
}

/// Message glyph metrics used by the message layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphMetrics {
	/// Rendered glyph width and height (px).
	pub size: f64,
	/// Horizontal advance between glyphs in a word (px).
	pub advance: f64,
	/// Width of a space between words (px).
	pub space: f64,
	/// Distance between baselines (px).
	pub line_height: f64,
}

impl Default for GlyphMetrics {
	fn default() -> Self {
		Self {
			size: 32.0,
			advance: 30.0,
			space: 16.0,
			line_height: 40.0,
		}
	}
}

/// Configuration resolved from the current viewport.
#[derive(Clone, Debug, PartialEq)]
pub struct SoupConfig {
	/// Viewport width (px).
	pub width: f64,
	/// Viewport height (px).
	pub height: f64,
	/// Number of background letters.
	pub particle_count: usize,
	/// Fraction of the smaller viewport side used as the max radius.
	pub radius_ratio: f64,
	/// Radius of a fully expanded clear zone (px).
	pub max_radius: f64,
	/// Clear-cycle timing and triggers.
	pub policy: ClearPolicy,
	/// Drift of background letters.
	pub drift: DriftConfig,
	/// Drift of quote glyphs.
	pub quote_drift: DriftConfig,
	/// Cursor repulsion.
	pub cursor: CursorConfig,
	/// Shake detection.
	pub shake: ShakeConfig,
	/// Quote glyph metrics.
	pub glyph: GlyphMetrics,
}

impl SoupConfig {
	/// Resolve all viewport-dependent values for a `width` x `height` viewport.
	pub fn resolve(width: f64, height: f64, policy: ClearPolicy) -> Self {
		let width = width.max(0.0);
		let height = height.max(0.0);
		let narrow = width < NARROW_WIDTH;
		let particle_count = if narrow {
			BASE_PARTICLE_COUNT / 2
		} else {
			BASE_PARTICLE_COUNT
		};
		let radius_ratio = if narrow {
			NARROW_RADIUS_RATIO
		} else {
			WIDE_RADIUS_RATIO
		};

		Self {
			width,
			height,
			particle_count,
			radius_ratio,
			max_radius: width.min(height) * radius_ratio,
			policy,
			drift: DriftConfig::BACKGROUND,
			quote_drift: DriftConfig::QUOTE,
			cursor: CursorConfig::default(),
			shake: ShakeConfig::default(),
			glyph: GlyphMetrics::default(),
		}
	}

	/// Re-resolve for a new viewport, keeping the policy and particle count.
	///
	/// Letters are created once, so the count is carried over even when the
	/// viewport crosses the narrow threshold.
	pub fn resized(&self, width: f64, height: f64) -> Self {
		Self {
			particle_count: self.particle_count,
			..Self::resolve(width, height, self.policy.clone())
		}
	}

	/// Center of the viewport, used by key and shake triggers.
	pub fn viewport_center(&self) -> (f64, f64) {
		(self.width / 2.0, self.height / 2.0)
	}

	/// Clamp a raw pointer location so a fully expanded circle stays on screen.
	pub fn clamp_center(&self, x: f64, y: f64) -> (f64, f64) {
		(
			clamp_axis(x, self.max_radius, self.width),
			clamp_axis(y, self.max_radius, self.height),
		)
	}
}

fn clamp_axis(value: f64, margin: f64, extent: f64) -> f64 {
	let (lo, hi) = (margin, extent - margin);
	if lo > hi {
		extent / 2.0
	} else {
		value.clamp(lo, hi)
	}
}

/// Page-level settings read from the embedded `soup-config` JSON script.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SoupSettings {
	/// Spreadsheet identifier for the quote source.
	pub sheet_id: Option<String>,
	/// Sheet (tab) name within the spreadsheet.
	pub sheet_name: Option<String>,
	/// Inline quotes used when no sheet is configured.
	pub quotes: Vec<String>,
	/// Policy preset name (`"classic"` or `"slow"`).
	pub policy: Option<String>,
}

impl SoupSettings {
	/// The named preset, or the default for a missing or unknown name.
	pub fn clear_policy(&self) -> ClearPolicy {
		self.policy
			.as_deref()
			.map(ClearPolicy::by_name)
			.unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wide_viewport_uses_base_values() {
		let config = SoupConfig::resolve(1920.0, 1080.0, ClearPolicy::classic());
		assert_eq!(config.particle_count, 600);
		assert_eq!(config.radius_ratio, WIDE_RADIUS_RATIO);
		assert!((config.max_radius - 324.0).abs() < 1e-9);
	}

	#[test]
	fn test_narrow_viewport_halves_count_and_grows_ratio() {
		let config = SoupConfig::resolve(400.0, 800.0, ClearPolicy::classic());
		assert_eq!(config.particle_count, 300);
		assert_eq!(config.radius_ratio, NARROW_RADIUS_RATIO);
		assert!((config.max_radius - 160.0).abs() < 1e-9);
	}

	#[test]
	fn test_resize_keeps_particle_count() {
		let config = SoupConfig::resolve(1920.0, 1080.0, ClearPolicy::slow());
		let resized = config.resized(600.0, 800.0);
		assert_eq!(resized.particle_count, 600);
		assert_eq!(resized.policy, ClearPolicy::slow());
		assert!((resized.max_radius - 240.0).abs() < 1e-9);
	}

	#[test]
	fn test_clamp_center_keeps_full_circle_on_screen() {
		let config = SoupConfig::resolve(1200.0, 1000.0, ClearPolicy::classic());
		let r = config.max_radius;
		assert_eq!(config.clamp_center(0.0, 0.0), (r, r));
		assert_eq!(config.clamp_center(5000.0, 5000.0), (1200.0 - r, 1000.0 - r));
		assert_eq!(config.clamp_center(600.0, 500.0), (600.0, 500.0));
	}

	#[test]
	fn test_clamp_center_degenerate_viewport() {
		let mut config = SoupConfig::resolve(100.0, 100.0, ClearPolicy::classic());
		config.max_radius = 80.0;
		assert_eq!(config.clamp_center(10.0, 90.0), (50.0, 50.0));
	}

	#[test]
	fn test_drift_is_periodic() {
		let drift = DriftConfig::BACKGROUND;
		let a = drift.offset(1234.0, 500.0);
		let b = drift.offset(1234.0 + drift.period_ms, 500.0);
		assert!((a.0 - b.0).abs() < 1e-9);
		assert!((a.1 - b.1).abs() < 1e-9);
		assert!((a.2 - b.2).abs() < 1e-9);
		let zero = drift.offset(0.0, 0.0);
		assert!(zero.0.abs() < 1e-9);
		assert!((zero.1 - drift.amplitude).abs() < 1e-9);
	}

	#[test]
	fn test_policy_lookup_and_cycle_length() {
		assert_eq!(ClearPolicy::by_name("slow").cycle_ms(), 5000.0);
		assert_eq!(ClearPolicy::by_name("unknown"), ClearPolicy::classic());
		let held = ClearPolicy {
			hold_ms: 500.0,
			..ClearPolicy::classic()
		};
		assert_eq!(held.contract_start_ms(), 2500.0);
	}

	#[test]
	fn test_settings_parse_with_defaults() {
		let settings: SoupSettings =
			serde_json::from_str(r#"{"sheet_id": "abc", "policy": "slow"}"#).unwrap();
		assert_eq!(settings.sheet_id.as_deref(), Some("abc"));
		assert!(settings.quotes.is_empty());
		assert_eq!(settings.clear_policy(), ClearPolicy::slow());
		assert_eq!(SoupSettings::default().clear_policy(), ClearPolicy::classic());
	}
}
