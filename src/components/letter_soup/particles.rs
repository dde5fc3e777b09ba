//! Background letter particles.
//!
//! Each particle has a physical position (moved by cursor repulsion and by
//! seeking its destination) and a render-only drift layered on top. Drift
//! never feeds back into position or velocity, so it stays exactly periodic.

use fastrand::Rng;

use super::config::{CLEARING_LERP, CursorConfig, DriftConfig, IDLE_LERP, SPAWN_JITTER, VELOCITY_DAMPING};

/// A 2D translate + rotate transform written to a visual node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
	/// Horizontal position (px).
	pub x: f64,
	/// Vertical position (px).
	pub y: f64,
	/// Degrees.
	pub rotation: f64,
}

/// A single background letter.
#[derive(Clone, Debug)]
pub struct Particle {
	/// Physical x position (px).
	pub x: f64,
	/// Physical y position (px).
	pub y: f64,
	/// Rest x position (px).
	pub rest_x: f64,
	/// Rest y position (px).
	pub rest_y: f64,
	/// Horizontal velocity (px per frame).
	pub vx: f64,
	/// Vertical velocity (px per frame).
	pub vy: f64,
	/// Degrees, unbounded.
	pub rotation: f64,
	/// Degrees per frame.
	pub rotation_speed: f64,
	/// Drift phase offset in `[0, period)` (ms).
	pub drift_phase: f64,
	/// Lowercase letter shown by this particle.
	pub letter: char,
}

/// Velocity impulse pushing a particle at `pos` away from `cursor`.
///
/// Linear falloff: zero at `radius`, strongest as distance approaches zero.
/// Returns `None` outside the radius, at distance zero, or without a cursor.
pub fn repulsion_impulse(
	pos: (f64, f64),
	cursor: Option<(f64, f64)>,
	config: &CursorConfig,
) -> Option<(f64, f64)> {
	let (cx, cy) = cursor?;
	let (dx, dy) = (pos.0 - cx, pos.1 - cy);
	let dist = dx.hypot(dy);
	if dist <= 0.0 || dist >= config.radius {
		return None;
	}
	let push = (1.0 - dist / config.radius) * config.strength;
	Some((dx / dist * push, dy / dist * push))
}

/// Owns all background letters and their rendered transforms.
pub struct ParticleField {
	/// One particle per target, in target order.
	pub particles: Vec<Particle>,
	transforms: Vec<Transform>,
	drift: DriftConfig,
}

impl ParticleField {
	/// Create one particle per target, spawned near its rest position.
	pub fn new(rng: &mut Rng, targets: &[(f64, f64)], drift: DriftConfig) -> Self {
		let particles: Vec<Particle> = targets
			.iter()
			.map(|&(tx, ty)| Particle {
				x: tx + (rng.f64() * 2.0 - 1.0) * SPAWN_JITTER,
				y: ty + (rng.f64() * 2.0 - 1.0) * SPAWN_JITTER,
				rest_x: tx,
				rest_y: ty,
				vx: 0.0,
				vy: 0.0,
				rotation: rng.f64() * 360.0,
				rotation_speed: (rng.f64() - 0.5) * 0.02,
				drift_phase: rng.f64() * drift.period_ms,
				letter: rng.lowercase(),
			})
			.collect();
		let transforms = vec![Transform::default(); particles.len()];

		Self {
			particles,
			transforms,
			drift,
		}
	}

	/// Number of particles.
	pub fn len(&self) -> usize {
		self.particles.len()
	}

	/// True when the field holds no particles.
	pub fn is_empty(&self) -> bool {
		self.particles.is_empty()
	}

	/// Transforms computed by the most recent [`ParticleField::step`].
	pub fn transforms(&self) -> &[Transform] {
		&self.transforms
	}

	/// Kick every particle near the cursor away from it.
	pub fn apply_cursor_repulsion(&mut self, cursor: Option<(f64, f64)>, config: &CursorConfig) {
		if cursor.is_none() {
			return;
		}
		for p in &mut self.particles {
			if let Some((ix, iy)) = repulsion_impulse((p.x, p.y), cursor, config) {
				p.vx += ix;
				p.vy += iy;
			}
		}
	}

	/// Advance every particle by one frame.
	///
	/// `destination` maps a rest position to where the particle should head
	/// this frame. `clearing` selects the faster lerp used during a clear cycle.
	pub fn step<F>(&mut self, now: f64, clearing: bool, destination: F)
	where
		F: Fn((f64, f64)) -> (f64, f64),
	{
		let speed = if clearing { CLEARING_LERP } else { IDLE_LERP };

		for (p, out) in self.particles.iter_mut().zip(self.transforms.iter_mut()) {
			p.vx *= VELOCITY_DAMPING;
			p.vy *= VELOCITY_DAMPING;
			p.x += p.vx;
			p.y += p.vy;

			let (dest_x, dest_y) = destination((p.rest_x, p.rest_y));
			p.x += (dest_x - p.x) * speed;
			p.y += (dest_y - p.y) * speed;

			p.rotation += p.rotation_speed;

			let (dx, dy, dr) = self.drift.offset(now, p.drift_phase);
			*out = Transform {
				x: p.x + dx,
				y: p.y + dy,
				rotation: p.rotation + dr,
			};
		}
	}

	/// Scale rest and current positions to a new viewport size.
	pub fn resize(&mut self, old: (f64, f64), new: (f64, f64)) {
		if !(new.0 > 0.0 && new.1 > 0.0) {
			return;
		}
		let scale_x = if old.0 > 0.0 { new.0 / old.0 } else { 1.0 };
		let scale_y = if old.1 > 0.0 { new.1 / old.1 } else { 1.0 };

		for p in &mut self.particles {
			p.x *= scale_x;
			p.y *= scale_y;
			p.rest_x *= scale_x;
			p.rest_y *= scale_y;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn field_at(points: &[(f64, f64)]) -> ParticleField {
		let mut rng = Rng::with_seed(42);
		ParticleField::new(&mut rng, points, DriftConfig::BACKGROUND)
	}

	#[test]
	fn test_initialize_near_rest_positions() {
		let points = [(100.0, 100.0), (300.0, 50.0), (0.0, 0.0)];
		let field = field_at(&points);
		assert_eq!(field.len(), 3);
		for (p, &(tx, ty)) in field.particles.iter().zip(&points) {
			assert_eq!((p.rest_x, p.rest_y), (tx, ty));
			assert!((p.x - tx).abs() <= SPAWN_JITTER);
			assert!((p.y - ty).abs() <= SPAWN_JITTER);
			assert!((0.0..360.0).contains(&p.rotation));
			assert!(p.rotation_speed.abs() <= 0.01);
			assert!((0.0..DriftConfig::BACKGROUND.period_ms).contains(&p.drift_phase));
			assert!(p.letter.is_ascii_lowercase());
			assert_eq!((p.vx, p.vy), (0.0, 0.0));
		}
	}

	#[test]
	fn test_repulsion_falloff() {
		let config = CursorConfig {
			radius: 100.0,
			strength: 1.0,
		};
		let cursor = Some((0.0, 0.0));

		assert_eq!(repulsion_impulse((100.0, 0.0), cursor, &config), None);
		assert_eq!(repulsion_impulse((0.0, 0.0), cursor, &config), None);
		assert_eq!(repulsion_impulse((10.0, 0.0), None, &config), None);

		let near = repulsion_impulse((1.0, 0.0), cursor, &config).unwrap();
		let mid = repulsion_impulse((50.0, 0.0), cursor, &config).unwrap();
		let edge = repulsion_impulse((99.0, 0.0), cursor, &config).unwrap();
		assert!((near.0 - 0.99).abs() < 1e-9);
		assert!((mid.0 - 0.5).abs() < 1e-9);
		assert!(near.0 > mid.0 && mid.0 > edge.0 && edge.0 > 0.0);
	}

	#[test]
	fn test_repulsion_points_away_from_cursor() {
		let config = CursorConfig::default();
		let (ix, iy) = repulsion_impulse((90.0, 120.0), Some((100.0, 100.0)), &config).unwrap();
		assert!(ix < 0.0 && iy > 0.0);
		assert!((iy / ix + 2.0).abs() < 1e-9);
	}

	#[test]
	fn test_apply_repulsion_only_touches_nearby() {
		let mut field = field_at(&[(100.0, 100.0), (900.0, 900.0)]);
		field.particles[0].x = 110.0;
		field.particles[0].y = 100.0;
		field.apply_cursor_repulsion(Some((100.0, 100.0)), &CursorConfig::default());
		assert!(field.particles[0].vx > 0.0);
		assert_eq!(field.particles[0].vy, 0.0);
		assert_eq!((field.particles[1].vx, field.particles[1].vy), (0.0, 0.0));

		field.apply_cursor_repulsion(None, &CursorConfig::default());
		assert_eq!((field.particles[1].vx, field.particles[1].vy), (0.0, 0.0));
	}

	#[test]
	fn test_step_settles_toward_rest() {
		let mut field = field_at(&[(200.0, 200.0)]);
		field.particles[0].x = 260.0;
		field.particles[0].y = 140.0;
		for frame in 0..400 {
			field.step(frame as f64 * 16.0, false, |rest| rest);
		}
		let p = &field.particles[0];
		assert!((p.x - 200.0).abs() < 0.01);
		assert!((p.y - 200.0).abs() < 0.01);
	}

	#[test]
	fn test_clearing_lerp_outpaces_idle() {
		let mut idle = field_at(&[(0.0, 0.0)]);
		let mut clearing = field_at(&[(0.0, 0.0)]);
		idle.particles[0].x = 0.0;
		clearing.particles[0].x = 0.0;
		idle.step(0.0, false, |_| (100.0, 0.0));
		clearing.step(0.0, true, |_| (100.0, 0.0));
		assert!((idle.particles[0].x - 5.0).abs() < 1e-9);
		assert!((clearing.particles[0].x - 20.0).abs() < 1e-9);
	}

	#[test]
	fn test_damping_and_integration() {
		let mut field = field_at(&[(0.0, 0.0)]);
		let p = &mut field.particles[0];
		(p.x, p.y, p.vx, p.vy) = (0.0, 0.0, 10.0, 0.0);
		field.step(0.0, false, |_| (0.0, 0.0));
		let p = &field.particles[0];
		assert!((p.vx - 8.0).abs() < 1e-9);
		assert!((p.x - 8.0 * (1.0 - IDLE_LERP)).abs() < 1e-9);
	}

	#[test]
	fn test_drift_only_affects_transform() {
		let mut a = field_at(&[(50.0, 50.0)]);
		let mut b = field_at(&[(50.0, 50.0)]);
		a.step(0.0, false, |rest| rest);
		b.step(2500.0, false, |rest| rest);
		assert_eq!(a.particles[0].x, b.particles[0].x);
		assert_eq!(a.particles[0].y, b.particles[0].y);
		assert_ne!(a.transforms()[0], b.transforms()[0]);

		let p = &a.particles[0];
		let (dx, dy, dr) = DriftConfig::BACKGROUND.offset(0.0, p.drift_phase);
		let t = a.transforms()[0];
		assert!((t.x - (p.x + dx)).abs() < 1e-9);
		assert!((t.y - (p.y + dy)).abs() < 1e-9);
		assert!((t.rotation - (p.rotation + dr)).abs() < 1e-9);
	}

	#[test]
	fn test_rotation_is_unbounded() {
		let mut field = field_at(&[(0.0, 0.0)]);
		field.particles[0].rotation = 359.9;
		field.particles[0].rotation_speed = 0.5;
		field.step(0.0, false, |rest| rest);
		assert!((field.particles[0].rotation - 360.4).abs() < 1e-9);
	}

	#[test]
	fn test_resize_scales_positions() {
		let mut field = field_at(&[(100.0, 50.0)]);
		field.particles[0].x = 100.0;
		field.particles[0].y = 50.0;
		field.resize((1000.0, 500.0), (500.0, 1000.0));
		let p = &field.particles[0];
		assert_eq!((p.rest_x, p.rest_y), (50.0, 100.0));
		assert_eq!((p.x, p.y), (50.0, 100.0));
	}

	#[test]
	fn test_resize_to_empty_viewport_is_ignored() {
		let mut field = field_at(&[(100.0, 50.0)]);
		field.resize((1000.0, 500.0), (1000.0, 0.0));
		assert_eq!((field.particles[0].rest_x, field.particles[0].rest_y), (100.0, 50.0));
	}
}
