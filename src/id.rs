use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REF: AtomicU64 = AtomicU64::new(1);
static NEXT_WATCHER: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`Ref`](crate::Ref). Shared by every clone of the same cell.
///
/// Ids are handed out in creation order, which is also the order in which
/// registration acquires cell locks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RefId(u64);

impl RefId {
	pub(crate) fn next() -> Self {
		RefId(NEXT_REF.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Debug for RefId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "RefId({})", self.0)
	}
}

/// Identity of one registration.
///
/// Registering the same closure twice yields two distinct ids. The id is only
/// a lookup key, it does not own anything.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatcherId(u64);

impl WatcherId {
	pub(crate) fn next() -> Self {
		WatcherId(NEXT_WATCHER.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Debug for WatcherId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "WatcherId({})", self.0)
	}
}

impl fmt::Display for WatcherId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
