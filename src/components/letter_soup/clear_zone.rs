//! Expand / hold / contract lifecycle of the circular clear zone.
//!
//! A trigger always restarts the cycle from the new center; there is never
//! more than one cycle in flight. Radius is a pure function of the time since
//! the trigger, so [`ClearZone::update`] can be called at any frame rate.

use super::config::ClearPolicy;

/// Fast rise, gentle settle.
pub fn ease_out6(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	1.0 - (1.0 - t).powi(6)
}

/// Lifecycle phase of the clear zone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClearPhase {
	/// No cycle in flight; radius is zero.
	#[default]
	Idle,
	/// Radius rising toward the max radius.
	Expanding,
	/// Radius held at the max radius.
	Holding,
	/// Radius falling back to zero.
	Contracting,
}

/// Phase and radius for a point in time, `elapsed` ms after a trigger.
pub fn phase_at(policy: &ClearPolicy, elapsed: f64, max_radius: f64) -> (ClearPhase, f64) {
	let elapsed = elapsed.max(0.0);
	if elapsed < policy.expand_ms {
		let t = if policy.expand_ms > 0.0 {
			elapsed / policy.expand_ms
		} else {
			1.0
		};
		return (ClearPhase::Expanding, ease_out6(t) * max_radius);
	}

	let contract_start = policy.contract_start_ms();
	if elapsed < contract_start {
		return (ClearPhase::Holding, max_radius);
	}

	let t2 = if policy.contract_ms > 0.0 {
		((elapsed - contract_start) / policy.contract_ms).clamp(0.0, 1.0)
	} else {
		1.0
	};
	if t2 >= 1.0 {
		(ClearPhase::Idle, 0.0)
	} else {
		(ClearPhase::Contracting, ease_out6(1.0 - t2) * max_radius)
	}
}

/// The clear-zone state machine.
#[derive(Clone, Debug)]
pub struct ClearZone {
	phase: ClearPhase,
	start: Option<f64>,
	center: (f64, f64),
	max_radius: f64,
	radius: f64,
	policy: ClearPolicy,
	cycles: u64,
}

impl ClearZone {
	/// Idle zone following `policy`, fully expanding to `max_radius`.
	pub fn new(policy: ClearPolicy, max_radius: f64) -> Self {
		Self {
			phase: ClearPhase::Idle,
			start: None,
			center: (0.0, 0.0),
			max_radius,
			radius: 0.0,
			policy,
			cycles: 0,
		}
	}

	/// Phase as of the last update.
	pub fn phase(&self) -> ClearPhase {
		self.phase
	}

	/// Radius as of the last update.
	pub fn radius(&self) -> f64 {
		self.radius
	}

	/// Center of the current or most recent cycle.
	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	/// Radius at full expansion.
	pub fn max_radius(&self) -> f64 {
		self.max_radius
	}

	/// Trigger time of the cycle in flight.
	pub fn start(&self) -> Option<f64> {
		self.start
	}

	/// Timing policy driving the cycle.
	pub fn policy(&self) -> &ClearPolicy {
		&self.policy
	}

	/// Number of cycles started so far; doubles as the cycle id.
	pub fn cycles(&self) -> u64 {
		self.cycles
	}

	/// True while a cycle is in flight.
	pub fn is_active(&self) -> bool {
		self.phase != ClearPhase::Idle
	}

	/// Start a new cycle at `center`, abandoning any cycle in flight.
	pub fn trigger(&mut self, center: (f64, f64), now: f64) -> u64 {
		self.center = center;
		self.start = Some(now);
		self.phase = ClearPhase::Expanding;
		self.radius = 0.0;
		self.cycles += 1;
		self.cycles
	}

	/// Advance the phase and radius to time `now`.
	pub fn update(&mut self, now: f64) -> f64 {
		let Some(start) = self.start else {
			self.phase = ClearPhase::Idle;
			self.radius = 0.0;
			return 0.0;
		};

		let (phase, radius) = phase_at(&self.policy, now - start, self.max_radius);
		self.phase = phase;
		self.radius = radius;
		if phase == ClearPhase::Idle {
			self.start = None;
		}
		radius
	}

	/// Where a particle resting at `rest` should head this frame.
	///
	/// Rest positions inside the current circle are pushed out to its edge
	/// along the same angle from the center; everything else stays put.
	pub fn destination(&self, rest: (f64, f64)) -> (f64, f64) {
		if !self.is_active() {
			return rest;
		}
		let (dx, dy) = (rest.0 - self.center.0, rest.1 - self.center.1);
		let dist = dx.hypot(dy);
		if dist >= self.radius {
			return rest;
		}
		let angle = dy.atan2(dx);
		(
			self.center.0 + angle.cos() * self.radius,
			self.center.1 + angle.sin() * self.radius,
		)
	}

	/// Apply a new viewport's max radius. Takes effect immediately.
	pub fn set_max_radius(&mut self, max_radius: f64) {
		self.max_radius = max_radius;
	}

	/// Move the center of the cycle in flight without restarting it.
	pub fn recenter(&mut self, center: (f64, f64)) {
		self.center = center;
	}
}
