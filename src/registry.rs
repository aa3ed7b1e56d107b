use std::collections::BTreeMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::watcher::WatcherBody;
use crate::WatcherId;

/// Watchers registered on one cell, keyed by registration identity.
///
/// Ordered by id, so fan-out visits watchers in registration order.
pub(crate) struct Registry<T> {
	watchers: BTreeMap<WatcherId, Arc<WatcherBody<T>>>,
}

impl<T> Default for Registry<T> {
	fn default() -> Self {
		Registry {
			watchers: BTreeMap::new(),
		}
	}
}

impl<T> Registry<T> {
	pub fn insert(&mut self, watcher: Arc<WatcherBody<T>>) {
		self.watchers.insert(watcher.id(), watcher);
	}

	pub fn remove(&mut self, id: WatcherId) -> bool {
		self.watchers.remove(&id).is_some()
	}

	pub fn len(&self) -> usize {
		self.watchers.len()
	}

	/// Copies the current watcher set, so that fan-out never iterates the map
	/// itself.
	pub fn snapshot(&self) -> SmallVec<[Arc<WatcherBody<T>>; 4]> {
		self.watchers.values().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dependencies::Dependencies;
	use crate::spawn::Threads;
	use crate::Ref;

	fn watcher(deps: &[Ref<u8>]) -> Arc<WatcherBody<u8>> {
		Arc::new(WatcherBody::new(
			"test",
			Dependencies::new(deps).unwrap(),
			|_: &[u8], _: Option<&[u8]>, _: &crate::Token| {},
			Arc::new(Threads::new()),
		))
	}

	#[test]
	fn keeps_distinct_registrations_apart() {
		let cell = Ref::new(0u8);
		let first = watcher(&[cell.clone()]);
		let second = watcher(&[cell.clone()]);

		let mut registry = Registry::default();
		registry.insert(first.clone());
		registry.insert(second.clone());
		registry.insert(first.clone());

		assert_eq!(registry.len(), 2);

		let ids = registry
			.snapshot()
			.iter()
			.map(|watcher| watcher.id())
			.collect::<Vec<_>>();
		assert_eq!(ids, vec![first.id(), second.id()]);
	}

	#[test]
	fn remove_reports_presence() {
		let cell = Ref::new(0u8);
		let only = watcher(&[cell]);

		let mut registry = Registry::default();
		registry.insert(only.clone());

		assert!(registry.remove(only.id()));
		assert!(!registry.remove(only.id()));
		assert_eq!(registry.len(), 0);
	}
}
