use std::io;
use std::sync::Arc;
use std::thread;

use tokio::runtime::Handle;

/// One scheduled watcher invocation, ready to run.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Starts watcher invocations as independent units of work.
///
/// Implementations must not run the task on the calling thread: `spawn` is
/// called while the written cell is locked.
pub trait Spawn: Send + Sync + 'static {
	fn spawn(&self, task: Task) -> io::Result<()>;
}

impl<S: Spawn + ?Sized> Spawn for Arc<S> {
	fn spawn(&self, task: Task) -> io::Result<()> {
		(**self).spawn(task)
	}
}

/// Runs every invocation on its own OS thread. This is the default.
#[derive(Debug, Clone, Default)]
pub struct Threads {
	stack_size: Option<usize>,
}

impl Threads {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn stack_size(mut self, bytes: usize) -> Self {
		self.stack_size = Some(bytes);
		self
	}
}

impl Spawn for Threads {
	fn spawn(&self, task: Task) -> io::Result<()> {
		let mut builder = thread::Builder::new().name("refwatch-watcher".into());
		if let Some(bytes) = self.stack_size {
			builder = builder.stack_size(bytes);
		}

		builder.spawn(task).map(|_| ())
	}
}

/// Runs invocations on the blocking pool of a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioBlocking {
	handle: Handle,
}

impl TokioBlocking {
	pub fn new(handle: Handle) -> Self {
		TokioBlocking { handle }
	}

	/// Uses the runtime the caller is running inside of.
	pub fn current() -> io::Result<Self> {
		Handle::try_current()
			.map(TokioBlocking::new)
			.map_err(|err| io::Error::new(io::ErrorKind::Other, err))
	}
}

impl Spawn for TokioBlocking {
	fn spawn(&self, task: Task) -> io::Result<()> {
		drop(self.handle.spawn_blocking(task));
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use std::sync::mpsc::channel;

	use super::*;

	#[test]
	fn threads_run_off_the_caller() {
		let caller = thread::current().id();
		let (tx, rx) = channel();

		Threads::new()
			.spawn(Box::new(move || {
				tx.send(thread::current().id()).unwrap();
			}))
			.unwrap();

		assert_ne!(rx.recv().unwrap(), caller);
	}

	#[tokio::test(flavor = "multi_thread")]
	async fn tokio_blocking_uses_current_runtime() {
		let (tx, rx) = tokio::sync::oneshot::channel();

		TokioBlocking::current()
			.unwrap()
			.spawn(Box::new(move || {
				tx.send(thread::current().name().map(str::to_owned)).unwrap();
			}))
			.unwrap();

		assert!(rx.await.is_ok());
	}

	#[test]
	fn tokio_blocking_needs_a_runtime() {
		assert!(TokioBlocking::current().is_err());
	}
}
