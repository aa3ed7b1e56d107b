use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::spawn::{Spawn, Task};

/// Hands the invocations of one watcher to the spawner in scheduling order.
///
/// Invocation `n + 1` reaches the spawner only once invocation `n` has
/// started (or is known never to start). Until then it is parked here, so a
/// worker never sits waiting for its predecessor.
pub(crate) struct Sequencer {
	spawner: Arc<dyn Spawn>,
	state: Mutex<SequencerState>,
}

struct SequencerState {
	/// Sequence numbers below this may go to the spawner right away.
	open: u64,
	parked: BTreeMap<u64, Task>,
}

impl Sequencer {
	pub fn new(spawner: Arc<dyn Spawn>) -> Self {
		Sequencer {
			spawner,
			state: Mutex::new(SequencerState {
				open: 1,
				parked: BTreeMap::new(),
			}),
		}
	}

	/// Caller hands out `seq` values consecutively, starting from zero, and
	/// the task calls [`Sequencer::started`] with its `seq` first thing.
	///
	/// Only a failure to spawn right now is reported; a parked task that later
	/// fails to spawn is logged and dropped.
	pub fn submit(&self, seq: u64, task: Task) -> io::Result<()> {
		{
			let mut state = self.state.lock();
			if seq >= state.open {
				state.parked.insert(seq, task);
				return Ok(());
			}
		}

		self.spawner.spawn(task).map_err(|err| {
			self.started(seq);
			err
		})
	}

	/// Marks `seq` as started, releasing its successor if that one is parked.
	pub fn started(&self, seq: u64) {
		let mut seq = seq;
		loop {
			let task = {
				let mut state = self.state.lock();
				state.open = state.open.max(seq + 2);
				match state.parked.remove(&(seq + 1)) {
					Some(task) => task,
					None => return,
				}
			};

			match self.spawner.spawn(task) {
				Ok(()) => return,
				Err(err) => {
					tracing::error!(error = %err, seq = seq + 1, "failed to start parked watcher invocation");
					seq += 1;
				}
			}
		}
	}
}
