//! Thread-safe reactive references.
//!
//! A [`Ref`] holds a value. [`watch`] registers a function against an explicit
//! list of refs: it runs once right away and again after every write to any of
//! them, each time as its own concurrent unit of work, with the current and
//! previous values of all dependencies and a [`Token`] that gets cancelled as
//! soon as that invocation is superseded or the [`Subscription`] is stopped.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//!
//! use refwatch::{watch, Ref};
//!
//! let id = Ref::new(1);
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let mut subscription = watch(&[id.clone()], {
//! 	let log = log.clone();
//! 	move |actual, _previous, _token| log.lock().unwrap().push(actual[0])
//! })
//! .unwrap();
//!
//! subscription.initial().unwrap().wait();
//! id.set(2).wait();
//! subscription.stop();
//! id.set(3);
//!
//! assert_eq!(*log.lock().unwrap(), vec![1, 2]);
//! ```

pub mod macros;

mod completion;
mod dependencies;
mod error;
mod id;
mod r#ref;
mod registry;
mod sequencer;
mod spawn;
mod subscription;
mod token;
mod watcher;

pub use completion::{Completion, Dispatch, Outcome};
pub use error::WatchError;
pub use id::{RefId, WatcherId};
pub use r#ref::Ref;
pub use spawn::{Spawn, Task, Threads, TokioBlocking};
pub use subscription::{watch, Subscription, Watch};
pub use token::{Cancelled, Token};
