use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tokio_util::sync::CancellationToken;

/// Returned by [`Token::sleep`] when the token got cancelled while sleeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("watcher invocation was cancelled")]
pub struct Cancelled;

/// Cooperative abort signal handed to every watcher invocation.
///
/// A fresh token is issued each time a watcher is scheduled. It gets
/// cancelled when one of the watcher's dependencies is written again, or when
/// the subscription is stopped. Nothing is interrupted forcibly: the watcher
/// body is expected to look at the token and bail out.
#[derive(Clone)]
pub struct Token {
	body: Arc<TokenBody>,
}

struct TokenBody {
	cancelled: Mutex<bool>,
	wakeup: Condvar,
	async_token: CancellationToken,
}

impl Token {
	pub(crate) fn new() -> Self {
		Token {
			body: Arc::new(TokenBody {
				cancelled: Mutex::new(false),
				wakeup: Condvar::new(),
				async_token: CancellationToken::new(),
			}),
		}
	}

	/// Cancels the token. Only the first call has any effect.
	pub fn cancel(&self) {
		let mut cancelled = self.body.cancelled.lock();
		if *cancelled {
			return;
		}

		*cancelled = true;
		self.body.async_token.cancel();
		self.body.wakeup.notify_all();
	}

	#[inline]
	pub fn is_cancelled(&self) -> bool {
		self.body.async_token.is_cancelled()
	}

	/// Blocks the current thread for `duration`, waking up early if the token
	/// gets cancelled in the meantime.
	pub fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
		let mut cancelled = self.body.cancelled.lock();
		if !*cancelled {
			self.body
				.wakeup
				.wait_while_for(&mut cancelled, |cancelled| !*cancelled, duration);
		}

		if *cancelled {
			Err(Cancelled)
		} else {
			Ok(())
		}
	}

	/// Completes once the token is cancelled.
	pub async fn cancelled(&self) {
		self.body.async_token.cancelled().await
	}

	/// A `tokio_util` token that is cancelled together with this one, for
	/// handing to async code that already speaks `CancellationToken`.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.body.async_token.child_token()
	}
}

impl Debug for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Token")
			.field("cancelled", &self.is_cancelled())
			.finish()
	}
}
