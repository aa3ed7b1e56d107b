use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::completion::{completion, Completion, Outcome, Reporter};
use crate::dependencies::{Dependencies, Values};
use crate::sequencer::Sequencer;
use crate::spawn::Spawn;
use crate::{RefId, Token, WatcherId};

pub(crate) type WatcherFn<T> = dyn Fn(&[T], Option<&[T]>, &Token) + Send + Sync;

/// Type-erased view of a watcher, all a subscription needs to tear it down.
pub(crate) trait Detach: Send + Sync + 'static {
	fn detach(&self);
}

pub(crate) struct WatcherBody<T> {
	id: WatcherId,
	name: &'static str,
	pub(crate) deps: Dependencies<T>,
	func: Box<WatcherFn<T>>,
	sequencer: Sequencer,
	inner: Mutex<WatcherInner>,
}

struct WatcherInner {
	/// Token of the most recently scheduled invocation.
	token: Option<Token>,
	/// Sequence number of the next invocation.
	seq: u64,
	stopped: bool,
}

impl<T> WatcherBody<T> {
	pub fn new<F>(
		name: &'static str,
		deps: Dependencies<T>,
		func: F,
		spawner: Arc<dyn Spawn>,
	) -> Self
	where
		F: Fn(&[T], Option<&[T]>, &Token) + Send + Sync + 'static,
	{
		WatcherBody {
			id: WatcherId::next(),
			name,
			deps,
			func: Box::new(func),
			sequencer: Sequencer::new(spawner),
			inner: Mutex::new(WatcherInner {
				token: None,
				seq: 0,
				stopped: false,
			}),
		}
	}

	#[inline]
	pub fn id(&self) -> WatcherId {
		self.id
	}

	#[inline]
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Cancels the token of the invocation currently considered fresh.
	pub fn supersede(&self) {
		if let Some(token) = &self.inner.lock().token {
			token.cancel();
		}
	}
}

impl<T> WatcherBody<T>
where
	T: Send + Sync + 'static,
{
	/// Issues a fresh token and hands one invocation to the spawner, once
	/// every earlier invocation has started.
	///
	/// Returns `Ok(None)` once the watcher has been stopped.
	pub fn schedule(
		self: &Arc<Self>,
		actual: Values<T>,
		previous: Option<Values<T>>,
	) -> io::Result<Option<Completion>> {
		let (token, seq) = {
			let mut inner = self.inner.lock();
			if inner.stopped {
				return Ok(None);
			}

			let token = Token::new();
			if let Some(stale) = inner.token.replace(token.clone()) {
				stale.cancel();
			}

			let seq = inner.seq;
			inner.seq += 1;
			(token, seq)
		};

		let (reporter, completion) = completion();
		let watcher = self.clone();
		self.sequencer.submit(
			seq,
			Box::new(move || {
				watcher.sequencer.started(seq);
				watcher.run(actual, previous, token, reporter)
			}),
		)?;

		Ok(Some(completion))
	}

	fn run(
		&self,
		actual: Values<T>,
		previous: Option<Values<T>>,
		token: Token,
		reporter: Reporter,
	) {
		let span = tracing::trace_span!("watcher", name = self.name, id = %self.id);
		let _enter = span.enter();

		tracing::trace!(initial = previous.is_none(), "invocation started");
		(self.func)(&actual, previous.as_deref(), &token);

		let outcome = if token.is_cancelled() {
			Outcome::Superseded
		} else {
			Outcome::Finished
		};

		tracing::trace!(?outcome, "invocation finished");
		reporter.report(outcome);
	}
}

impl<T> WatcherBody<T>
where
	T: Clone + Send + Sync + 'static,
{
	/// Fan-out step for one watcher after `source` changed from `previous`
	/// to `current`. Called with `source` locked.
	pub fn changed(self: &Arc<Self>, source: RefId, current: &T, previous: &T) -> Option<Completion> {
		let (actual, before) = self.deps.changed(source, current, previous);

		match self.schedule(actual, Some(before)) {
			Ok(completion) => completion,
			Err(err) => {
				tracing::error!(
					watcher = self.name,
					id = %self.id,
					error = %err,
					"failed to start watcher invocation"
				);
				None
			}
		}
	}
}

impl<T> Detach for WatcherBody<T>
where
	T: Send + Sync + 'static,
{
	fn detach(&self) {
		let stale = {
			let mut inner = self.inner.lock();
			inner.stopped = true;
			inner.token.take()
		};

		self.deps.detach(self.id);

		if let Some(token) = stale {
			token.cancel();
		}

		tracing::debug!(watcher = self.name, id = %self.id, "watcher stopped");
	}
}

impl<T> std::fmt::Debug for WatcherBody<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Watcher")
			.field("id", &self.id)
			.field("name", &self.name)
			.field("deps", &self.deps.len())
			.finish()
	}
}
