//! Normalizes pointer, keyboard, touch and device-motion signals.
//!
//! Host event handlers only record what happened here. The frame loop reads
//! the cursor and takes the pending trigger once per tick; no animation math
//! runs inside an event handler.

use super::config::{ShakeConfig, TriggerSources};

/// Key code that triggers an ambient clear cycle.
pub const TRIGGER_KEY: &str = "Space";

/// Where a clear trigger came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerKind {
	/// The designated key.
	Key,
	/// Primary click or tap.
	Click,
	/// Device shake.
	Shake,
}

/// A clear trigger waiting for the next frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRequest {
	/// Source of the trigger.
	pub kind: TriggerKind,
	/// Raw pointer location for clicks; `None` means the viewport center.
	pub point: Option<(f64, f64)>,
}

/// One accelerometer sample. Missing axes are read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Acceleration {
	/// X axis (m/s²).
	pub x: Option<f64>,
	/// Y axis (m/s²).
	pub y: Option<f64>,
	/// Z axis (m/s²).
	pub z: Option<f64>,
}

impl Acceleration {
	fn axes(&self) -> (f64, f64, f64) {
		(
			self.x.unwrap_or(0.0),
			self.y.unwrap_or(0.0),
			self.z.unwrap_or(0.0),
		)
	}
}

/// State of device-motion access.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionAccess {
	/// Platform has no permission gate; the listener attaches at startup.
	#[default]
	Ungated,
	/// Permission must be requested from the first user touch.
	AwaitingGesture,
	/// Permission request in flight.
	Requested,
	/// Granted by the user.
	Granted,
	/// Rejected or errored. Shake never triggers.
	Denied,
}

impl MotionAccess {
	/// True when motion samples may trigger a shake.
	pub fn allows_shake(self) -> bool {
		matches!(self, MotionAccess::Ungated | MotionAccess::Granted)
	}
}

/// Detects shakes from frame-to-frame acceleration deltas with a cooldown.
#[derive(Clone, Debug)]
pub struct ShakeDetector {
	config: ShakeConfig,
	last: (f64, f64, f64),
	last_shake: Option<f64>,
}

impl ShakeDetector {
	/// Detector with no previous sample.
	pub fn new(config: ShakeConfig) -> Self {
		Self {
			config,
			last: (0.0, 0.0, 0.0),
			last_shake: None,
		}
	}

	/// Feed one sample taken at `now` (ms). Returns true when a shake is accepted.
	pub fn sample(&mut self, accel: Acceleration, now: f64) -> bool {
		let (x, y, z) = accel.axes();
		let (dx, dy, dz) = (x - self.last.0, y - self.last.1, z - self.last.2);
		self.last = (x, y, z);

		let magnitude = (dx * dx + dy * dy + dz * dz).sqrt();
		if magnitude <= self.config.threshold {
			return false;
		}
		let cooled = self
			.last_shake
			.is_none_or(|t| now - t >= self.config.cooldown_ms);
		if cooled {
			self.last_shake = Some(now);
		}
		cooled
	}
}

/// Shared input state written by event handlers and read by the frame loop.
#[derive(Clone, Debug)]
pub struct InputBridge {
	cursor: Option<(f64, f64)>,
	pending: Option<TriggerRequest>,
	shake: ShakeDetector,
	motion: MotionAccess,
	sources: TriggerSources,
}

impl InputBridge {
	/// Bridge accepting triggers from `sources`.
	pub fn new(sources: TriggerSources, shake: ShakeConfig) -> Self {
		Self {
			cursor: None,
			pending: None,
			shake: ShakeDetector::new(shake),
			motion: MotionAccess::default(),
			sources,
		}
	}

	/// Current repulsion point, if a pointer or touch is active.
	pub fn cursor(&self) -> Option<(f64, f64)> {
		self.cursor
	}

	/// Pointer moved to `(x, y)` in container coordinates.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		self.cursor = Some((x, y));
	}

	/// Pointer left the container.
	pub fn pointer_leave(&mut self) {
		self.cursor = None;
	}

	/// First active touch point, if any.
	pub fn touch_move(&mut self, touch: Option<(f64, f64)>) {
		if let Some((x, y)) = touch {
			self.cursor = Some((x, y));
		}
	}

	/// All touches lifted.
	pub fn touch_end(&mut self) {
		self.cursor = None;
	}

	/// Returns true when the key was consumed as a trigger.
	pub fn key_down(&mut self, code: &str) -> bool {
		if !self.sources.key || code != TRIGGER_KEY {
			return false;
		}
		self.request(TriggerKind::Key, None);
		true
	}

	/// Primary click or tap at `(x, y)`.
	pub fn click(&mut self, x: f64, y: f64) -> bool {
		if !self.sources.click {
			return false;
		}
		self.request(TriggerKind::Click, Some((x, y)));
		true
	}

	/// Device-motion sample. `None` when the event carried no acceleration.
	pub fn device_motion(&mut self, accel: Option<Acceleration>, now: f64) -> bool {
		let Some(accel) = accel else {
			return false;
		};
		if !self.sources.shake || !self.motion.allows_shake() {
			return false;
		}
		if !self.shake.sample(accel, now) {
			return false;
		}
		self.request(TriggerKind::Shake, None);
		true
	}

	/// Current device-motion access state.
	pub fn motion_access(&self) -> MotionAccess {
		self.motion
	}

	/// Record the outcome of a permission check or request.
	pub fn set_motion_access(&mut self, access: MotionAccess) {
		self.motion = access;
	}

	/// True exactly once per page when a permission prompt should be shown.
	pub fn begin_motion_request(&mut self) -> bool {
		if self.motion != MotionAccess::AwaitingGesture {
			return false;
		}
		self.motion = MotionAccess::Requested;
		true
	}

	/// Take the trigger waiting for this frame, if any.
	pub fn take_trigger(&mut self) -> Option<TriggerRequest> {
		self.pending.take()
	}

	// Latest trigger wins; a frame only ever starts one cycle.
	fn request(&mut self, kind: TriggerKind, point: Option<(f64, f64)>) {
		self.pending = Some(TriggerRequest { kind, point });
	}
}
