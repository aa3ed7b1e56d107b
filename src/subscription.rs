use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::completion::Completion;
use crate::dependencies::Dependencies;
use crate::spawn::{Spawn, Threads};
use crate::watcher::{Detach, WatcherBody};
use crate::{Ref, Token, WatchError, WatcherId};

/// Runs `func` now and every time one of `deps` is written, until the returned
/// subscription is stopped.
///
/// `func` receives the current value of every dependency, in the order of
/// `deps`, the values from before the triggering write (`None` for the first
/// call), and the token of this invocation. Every invocation runs on its own
/// thread, see [`Watch`] to change that.
///
/// The watcher stays registered until [`Subscription::stop`] is called.
/// Dropping the subscription without stopping it leaks the watcher: the cells
/// hold the watcher and the watcher holds the cells, so neither is ever freed
/// and `func` keeps running on every write.
///
/// ```
/// use refwatch::{watch, Ref};
///
/// let count = Ref::new(1);
/// let mut subscription = watch(&[count.clone()], |actual, previous, _token| {
/// 	println!("count: {:?} -> {}", previous.map(|p| p[0]), actual[0]);
/// })
/// .unwrap();
///
/// subscription.initial().unwrap().wait();
/// count.set(2).wait();
/// subscription.stop();
/// ```
pub fn watch<T, F>(deps: &[Ref<T>], func: F) -> Result<Subscription, WatchError>
where
	T: Clone + Send + Sync + 'static,
	F: Fn(&[T], Option<&[T]>, &Token) + Send + Sync + 'static,
{
	Watch::new().watch(deps, func)
}

/// Registration options.
#[derive(Clone)]
pub struct Watch {
	name: &'static str,
	spawner: Arc<dyn Spawn>,
}

impl Default for Watch {
	fn default() -> Self {
		Watch {
			name: "<unnamed>",
			spawner: Arc::new(Threads::new()),
		}
	}
}

impl Watch {
	pub fn new() -> Self {
		Self::default()
	}

	/// Name reported in tracing spans.
	pub fn name(mut self, name: &'static str) -> Self {
		self.name = name;
		self
	}

	/// Where invocations run.
	pub fn spawner(mut self, spawner: impl Spawn) -> Self {
		self.spawner = Arc::new(spawner);
		self
	}

	/// Registers `func` on every cell in `deps` and schedules its first
	/// invocation. See [`watch`].
	///
	/// Fails without registering anything if `deps` names a cell twice or the
	/// first invocation cannot be started.
	pub fn watch<T, F>(self, deps: &[Ref<T>], func: F) -> Result<Subscription, WatchError>
	where
		T: Clone + Send + Sync + 'static,
		F: Fn(&[T], Option<&[T]>, &Token) + Send + Sync + 'static,
	{
		let deps = Dependencies::new(deps)?;
		let watcher = Arc::new(WatcherBody::new(self.name, deps, func, self.spawner));

		let initial = {
			let mut locked = watcher.deps.lock_all();

			// No write can land between this snapshot and the registration.
			let actual = watcher.deps.published();
			let initial = watcher.schedule(actual, None)?;

			for inner in locked.iter_mut() {
				inner.watchers.insert(watcher.clone());
			}

			initial
		};

		tracing::debug!(
			watcher = watcher.name(),
			id = %watcher.id(),
			deps = watcher.deps.len(),
			"watcher registered"
		);

		Ok(Subscription {
			id: watcher.id(),
			name: watcher.name(),
			watcher,
			stopped: AtomicBool::new(false),
			initial,
		})
	}
}

/// Handle to a registered watcher.
///
/// Dropping it does not stop the watcher, it stays registered on its cells
/// until [`Subscription::stop`] is called.
#[must_use = "a dropped subscription can no longer be stopped"]
pub struct Subscription {
	id: WatcherId,
	name: &'static str,
	watcher: Arc<dyn Detach>,
	stopped: AtomicBool,
	initial: Option<Completion>,
}

impl Subscription {
	#[inline]
	pub fn id(&self) -> WatcherId {
		self.id
	}

	/// Removes the watcher from all of its cells and cancels its pending
	/// invocation. Calls after the first one do nothing.
	pub fn stop(&self) {
		if self.stopped.swap(true, Ordering::AcqRel) {
			return;
		}

		self.watcher.detach();
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::Acquire)
	}

	/// Completion of the invocation scheduled at registration. Only the first
	/// call returns it.
	pub fn initial(&mut self) -> Option<Completion> {
		self.initial.take()
	}
}

impl Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("stopped", &self.is_stopped())
			.finish()
	}
}
