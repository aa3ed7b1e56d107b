use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use smallvec::SmallVec;
use tokio::sync::oneshot;

/// How a single watcher invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// The watcher returned while its token was still live.
	Finished,
	/// The watcher returned, but its token had been cancelled by then.
	Superseded,
	/// The watcher never returned: it panicked, or it could not be started.
	Dropped,
}

/// Resolves once one scheduled watcher invocation is over.
///
/// Every invocation has its own completion, so waiting on one never races
/// with other invocations of the same watcher.
#[derive(Debug)]
pub struct Completion {
	rx: oneshot::Receiver<Outcome>,
}

pub(crate) struct Reporter {
	tx: oneshot::Sender<Outcome>,
}

pub(crate) fn completion() -> (Reporter, Completion) {
	let (tx, rx) = oneshot::channel();
	(Reporter { tx }, Completion { rx })
}

impl Reporter {
	pub(crate) fn report(self, outcome: Outcome) {
		// Nobody waiting is fine.
		let _ = self.tx.send(outcome);
	}
}

impl Completion {
	/// Blocks the current thread until the invocation is over.
	///
	/// Panics when called from within an async runtime, await the completion
	/// there instead.
	pub fn wait(self) -> Outcome {
		self.rx.blocking_recv().unwrap_or(Outcome::Dropped)
	}
}

impl Future for Completion {
	type Output = Outcome;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
		Pin::new(&mut self.rx)
			.poll(cx)
			.map(|result| result.unwrap_or(Outcome::Dropped))
	}
}

/// Completions of every watcher invocation scheduled by one write.
///
/// Writes do not wait for watchers; dropping the dispatch keeps it that way.
#[derive(Debug, Default)]
pub struct Dispatch {
	completions: SmallVec<[Completion; 2]>,
}

impl Dispatch {
	pub(crate) fn push(&mut self, completion: Completion) {
		self.completions.push(completion);
	}

	/// Number of watcher invocations the write scheduled.
	pub fn len(&self) -> usize {
		self.completions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.completions.is_empty()
	}

	/// Blocks until every scheduled invocation is over.
	pub fn wait(self) -> Vec<Outcome> {
		self.completions.into_iter().map(Completion::wait).collect()
	}

	/// Resolves once every scheduled invocation is over.
	pub async fn done(self) -> Vec<Outcome> {
		futures::future::join_all(self.completions).await
	}
}

impl IntoIterator for Dispatch {
	type Item = Completion;
	type IntoIter = smallvec::IntoIter<[Completion; 2]>;

	fn into_iter(self) -> Self::IntoIter {
		self.completions.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use super::*;

	#[test]
	fn reported_outcome_reaches_waiter() {
		let (reporter, completion) = completion();
		thread::spawn(move || reporter.report(Outcome::Superseded));
		assert_eq!(completion.wait(), Outcome::Superseded);
	}

	#[test]
	fn lost_reporter_means_dropped() {
		let (reporter, completion) = completion();
		thread::spawn(move || {
			let _reporter = reporter;
			panic!("watcher blew up");
		})
		.join()
		.unwrap_err();

		assert_eq!(completion.wait(), Outcome::Dropped);
	}

	#[tokio::test]
	async fn dispatch_collects_all_outcomes() {
		let mut dispatch = Dispatch::default();
		let (first, done) = completion();
		dispatch.push(done);
		let (second, done) = completion();
		dispatch.push(done);

		first.report(Outcome::Finished);
		drop(second);

		assert_eq!(dispatch.len(), 2);
		assert_eq!(dispatch.done().await, vec![Outcome::Finished, Outcome::Dropped]);
	}
}
