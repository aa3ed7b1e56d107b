use fxhash::FxHashMap;
use parking_lot::MutexGuard;
use smallvec::SmallVec;

use crate::r#ref::RefInner;
use crate::{Ref, RefId, WatchError, WatcherId};

/// Values handed to a watcher, one per dependency, in dependency order.
pub(crate) type Values<T> = SmallVec<[T; 4]>;

/// The fixed, duplicate-free list of cells a watcher was registered with.
pub(crate) struct Dependencies<T> {
	refs: SmallVec<[Ref<T>; 4]>,
}

impl<T> Dependencies<T> {
	pub fn new(deps: &[Ref<T>]) -> Result<Self, WatchError> {
		let mut seen = FxHashMap::<RefId, usize>::default();
		for (index, dep) in deps.iter().enumerate() {
			if let Some(&first) = seen.get(&dep.id()) {
				return Err(WatchError::DuplicateDependency {
					id: dep.id(),
					first,
					index,
				});
			}
			seen.insert(dep.id(), index);
		}

		Ok(Dependencies {
			refs: deps.iter().cloned().collect(),
		})
	}

	pub fn len(&self) -> usize {
		self.refs.len()
	}

	/// Locks every dependency in ascending id order, so that concurrent
	/// registrations over overlapping cells cannot deadlock.
	pub fn lock_all(&self) -> SmallVec<[MutexGuard<'_, RefInner<T>>; 4]> {
		let mut order = self.refs.iter().collect::<SmallVec<[&Ref<T>; 4]>>();
		order.sort_unstable_by_key(|dep| dep.id());
		order.into_iter().map(|dep| dep.body.inner.lock()).collect()
	}

	/// Removes `watcher` from every dependency, one cell at a time.
	pub fn detach(&self, watcher: WatcherId) {
		for dep in &self.refs {
			dep.body.inner.lock().watchers.remove(watcher);
		}
	}
}

impl<T: Clone> Dependencies<T> {
	/// Latest published value of every dependency.
	pub fn published(&self) -> Values<T> {
		self.refs.iter().map(|dep| dep.get()).collect()
	}

	/// Current and previous values after `source` changed from `previous` to
	/// `current`. Every other dependency contributes its latest published
	/// value to both.
	pub fn changed(&self, source: RefId, current: &T, previous: &T) -> (Values<T>, Values<T>) {
		let mut actual = Values::with_capacity(self.refs.len());
		let mut before = Values::with_capacity(self.refs.len());

		for dep in &self.refs {
			if dep.id() == source {
				actual.push(current.clone());
				before.push(previous.clone());
			} else {
				let value = dep.get();
				before.push(value.clone());
				actual.push(value);
			}
		}

		(actual, before)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_duplicates_with_positions() {
		let a = Ref::new(1);
		let b = Ref::new(2);

		let err = Dependencies::new(&[a.clone(), b.clone(), a.clone()])
			.err()
			.unwrap();

		match err {
			WatchError::DuplicateDependency { id, first, index } => {
				assert_eq!(id, a.id());
				assert_eq!(first, 0);
				assert_eq!(index, 2);
			}
			other => panic!("unexpected error: {other}"),
		}
	}

	#[test]
	fn changed_swaps_in_source_values_only() {
		let a = Ref::new(1);
		let b = Ref::new(10);
		let deps = Dependencies::new(&[a.clone(), b.clone()]).unwrap();

		let (actual, previous) = deps.changed(b.id(), &20, &10);
		assert_eq!(actual.as_slice(), &[1, 20]);
		assert_eq!(previous.as_slice(), &[1, 10]);
	}

	#[test]
	fn lock_all_takes_every_cell() {
		let a = Ref::new('a');
		let b = Ref::new('b');
		let deps = Dependencies::new(&[b.clone(), a.clone()]).unwrap();

		let guards = deps.lock_all();
		assert_eq!(guards.len(), 2);
		assert!(a.body.inner.try_lock().is_none());
		assert!(b.body.inner.try_lock().is_none());
		drop(guards);

		assert_eq!(deps.published().as_slice(), &['b', 'a']);
	}
}
