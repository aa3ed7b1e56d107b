//! Looks up a product every time its id changes.
//!
//! Every line typed on stdin picks a new id (the number typed, or the next
//! one). Lookups are slow, press enter a few times in a row to see stale
//! ones getting cancelled. Run with `RUST_LOG=refwatch=trace` to follow the
//! watcher invocations.

use std::io::{self, BufRead};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use refwatch::{Cancelled, Ref, Token, Watch};
use tracing_subscriber::EnvFilter;

const PRODUCTS: u32 = 100;

/// Stand-in for a remote request that honours cancellation.
fn lookup(id: u32, token: &Token) -> Result<String, Cancelled> {
	token.sleep(Duration::from_millis(500))?;
	Ok(format!("Product #{id}"))
}

fn seed() -> u32 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|elapsed| elapsed.subsec_nanos() % PRODUCTS + 1)
		.unwrap_or(1)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.init();

	let product = Ref::new(seed());

	let subscription = Watch::new()
		.name("product-lookup")
		.watch(&[product.clone()], |actual, _previous, token| {
			let id = actual[0];
			match lookup(id, token) {
				Ok(title) => println!("Product title:\n - {title}"),
				Err(Cancelled) => tracing::info!(id, "lookup cancelled, product changed"),
			}
		})?;

	for line in io::stdin().lock().lines() {
		let line = line?;
		let next = line
			.trim()
			.parse()
			.unwrap_or_else(|_| product.get() % PRODUCTS + 1);
		product.set(next);
	}

	subscription.stop();
	Ok(())
}
