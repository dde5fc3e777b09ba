//! Jittered-grid rest positions for the background letters.

use fastrand::Rng;

/// Generate exactly `count` points covering a `width` x `height` viewport.
///
/// The viewport is split into a grid whose aspect matches the viewport, one
/// point is placed uniformly at random inside each cell, and the candidates
/// are shuffled and truncated. This gives even coverage without visible grid
/// lines.
pub fn generate_targets(rng: &mut Rng, width: f64, height: f64, count: usize) -> Vec<(f64, f64)> {
	if count == 0 {
		return Vec::new();
	}

	let aspect = if height > 0.0 { width / height } else { 1.0 };
	let cols = ((count as f64 * aspect).sqrt().round() as usize).clamp(1, count);
	let rows = count.div_ceil(cols);
	let (cell_w, cell_h) = (width / cols as f64, height / rows as f64);

	let mut points = Vec::with_capacity(cols * rows);
	for i in 0..cols {
		for j in 0..rows {
			points.push((
				i as f64 * cell_w + rng.f64() * cell_w,
				j as f64 * cell_h + rng.f64() * cell_h,
			));
		}
	}

	rng.shuffle(&mut points);
	points.truncate(count);
	points
}
