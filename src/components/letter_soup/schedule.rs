//! Epoch-scoped one-shot tasks run by the frame loop.
//!
//! Each clear cycle opens a new epoch. Tasks are stamped with the epoch that
//! scheduled them, and only tasks of the current epoch ever fire, so timers
//! left over from a superseded cycle cannot touch the replacement message.

/// Identifies the cycle that scheduled a task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Epoch(u64);

#[derive(Clone, Debug)]
struct Scheduled<T> {
	epoch: Epoch,
	at: f64,
	task: T,
}

/// A queue of timed tasks, drained once per frame.
#[derive(Clone, Debug)]
pub struct Scheduler<T> {
	epoch: Epoch,
	tasks: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
	fn default() -> Self {
		Self {
			epoch: Epoch::default(),
			tasks: Vec::new(),
		}
	}
}

impl<T> Scheduler<T> {
	/// Empty scheduler at the first epoch.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current epoch.
	pub fn epoch(&self) -> Epoch {
		self.epoch
	}

	/// Open a new epoch, cancelling every pending task from earlier ones.
	pub fn begin_epoch(&mut self) -> Epoch {
		self.epoch = Epoch(self.epoch.0 + 1);
		self.tasks.clear();
		self.epoch
	}

	/// Schedule `task` to fire at `at` (ms) within `epoch`.
	///
	/// Tasks for a stale epoch are dropped immediately.
	pub fn schedule(&mut self, epoch: Epoch, at: f64, task: T) {
		if epoch != self.epoch {
			return;
		}
		self.tasks.push(Scheduled { epoch, at, task });
	}

	/// Number of tasks not yet drained.
	pub fn pending(&self) -> usize {
		self.tasks.len()
	}

	/// Remove and return every current-epoch task due at or before `now`,
	/// earliest first.
	pub fn drain_due(&mut self, now: f64) -> Vec<T> {
		let current = self.epoch;
		let mut due = Vec::new();
		let mut keep = Vec::with_capacity(self.tasks.len());
		for s in self.tasks.drain(..) {
			if s.epoch != current {
				continue;
			}
			if s.at <= now {
				due.push(s);
			} else {
				keep.push(s);
			}
		}
		self.tasks = keep;
		due.sort_by(|a, b| a.at.total_cmp(&b.at));
		due.into_iter().map(|s| s.task).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_tasks_fire_in_time_order() {
		let mut scheduler = Scheduler::new();
		let epoch = scheduler.begin_epoch();
		scheduler.schedule(epoch, 300.0, "c");
		scheduler.schedule(epoch, 100.0, "a");
		scheduler.schedule(epoch, 200.0, "b");

		assert!(scheduler.drain_due(50.0).is_empty());
		assert_eq!(scheduler.drain_due(200.0), vec!["a", "b"]);
		assert_eq!(scheduler.pending(), 1);
		assert_eq!(scheduler.drain_due(1000.0), vec!["c"]);
		assert!(scheduler.drain_due(2000.0).is_empty());
	}

	#[test]
	fn test_new_epoch_cancels_pending_tasks() {
		let mut scheduler = Scheduler::new();
		let first = scheduler.begin_epoch();
		scheduler.schedule(first, 500.0, 1);

		let second = scheduler.begin_epoch();
		assert_ne!(first, second);
		assert_eq!(scheduler.pending(), 0);

		scheduler.schedule(first, 600.0, 2);
		scheduler.schedule(second, 700.0, 3);
		assert_eq!(scheduler.drain_due(1000.0), vec![3]);
	}
}
