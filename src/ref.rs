use std::fmt::Debug;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::completion::Dispatch;
use crate::registry::Registry;
use crate::RefId;

/// A shared, mutable cell whose writes notify the watchers registered on it.
///
/// Cloning a `Ref` clones the handle, both clones point to the same cell.
pub struct Ref<T> {
	pub(crate) body: Arc<RefBody<T>>,
}

pub(crate) struct RefBody<T> {
	id: RefId,
	/// Published value. Only stored to while `inner` is locked.
	value: ArcSwap<T>,
	pub(crate) inner: Mutex<RefInner<T>>,
}

/// Everything a write has to hold exclusively.
pub(crate) struct RefInner<T> {
	pub(crate) watchers: Registry<T>,
}

impl<T> Clone for Ref<T> {
	fn clone(&self) -> Self {
		Self {
			body: self.body.clone(),
		}
	}
}

impl<T> Default for Ref<T>
where
	T: Default,
{
	fn default() -> Self {
		Ref::new(Default::default())
	}
}

impl<T> Ref<T> {
	pub fn new(value: T) -> Self {
		Ref {
			body: Arc::new(RefBody {
				id: RefId::next(),
				value: ArcSwap::from_pointee(value),
				inner: Mutex::new(RefInner {
					watchers: Registry::default(),
				}),
			}),
		}
	}

	#[inline]
	pub fn id(&self) -> RefId {
		self.body.id
	}

	/// Current value without cloning it.
	#[inline]
	pub fn get_arc(&self) -> Arc<T> {
		self.body.value.load_full()
	}

	#[inline]
	pub fn get(&self) -> T
	where
		T: Clone,
	{
		T::clone(&self.body.value.load())
	}

	/// Number of watchers currently registered on this cell.
	pub fn watcher_count(&self) -> usize {
		self.body.inner.lock().watchers.len()
	}
}

impl<T> Ref<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Stores `value` and schedules every watcher registered on this cell.
	///
	/// Returns as soon as the watchers are scheduled. The returned
	/// [`Dispatch`] can be used to wait for them, or dropped.
	#[inline]
	pub fn set(&self, value: T) -> Dispatch {
		self.body.write(Arc::new(value)).1
	}

	/// Like [`Ref::set`], but hands back the value that was replaced.
	pub fn replace(&self, value: T) -> T {
		let (previous, _) = self.body.write(Arc::new(value));
		Arc::try_unwrap(previous).unwrap_or_else(|previous| T::clone(&previous))
	}

	/// Modifies the value in place. `func` runs while the cell is locked, so
	/// it must not write to this same cell.
	pub fn update(&self, func: impl FnOnce(&mut T)) -> Dispatch {
		let inner = self.body.inner.lock();
		let mut value = T::clone(&self.body.value.load());
		func(&mut value);
		self.body.write_locked(&inner, Arc::new(value)).1
	}
}

impl<T> RefBody<T>
where
	T: Clone + Send + Sync + 'static,
{
	fn write(&self, value: Arc<T>) -> (Arc<T>, Dispatch) {
		let inner = self.inner.lock();
		self.write_locked(&inner, value)
	}

	fn write_locked(&self, inner: &RefInner<T>, value: Arc<T>) -> (Arc<T>, Dispatch) {
		let watchers = inner.watchers.snapshot();

		// Stale invocations learn about the new value before any new one is
		// scheduled.
		for watcher in &watchers {
			watcher.supersede();
		}

		let previous = self.value.swap(value.clone());

		tracing::trace!(cell = ?self.id, watchers = watchers.len(), "value written");

		let mut dispatch = Dispatch::default();
		for watcher in watchers {
			if let Some(completion) = watcher.changed(self.id, &value, &previous) {
				dispatch.push(completion);
			}
		}

		(previous, dispatch)
	}
}

impl<T> Debug for Ref<T>
where
	T: Debug,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Ref")
			.field("id", &self.body.id)
			.field("value", &*self.body.value.load())
			.finish()
	}
}
