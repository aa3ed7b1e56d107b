use std::io;

use crate::RefId;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
	/// The same cell shows up twice in one dependency list, which would make
	/// the positional value slices ambiguous.
	#[error("dependency #{index} ({id:?}) duplicates dependency #{first}")]
	DuplicateDependency { id: RefId, first: usize, index: usize },

	/// The first invocation could not be started. Nothing was registered.
	#[error("failed to start watcher: {0}")]
	Spawn(#[from] io::Error),
}
