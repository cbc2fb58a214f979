//! Thread-safe in-memory [`MarkerStore`] for tests, demos, and embedders without durable storage.

// self
use crate::{
	_prelude::*,
	store::{MarkerStore, StoreFuture},
};

type FlagMap = Arc<RwLock<HashMap<String, bool>>>;

/// Process-local flag storage.
///
/// Clones share the same map, so a clone handed to a second client simulates the durable state a
/// restarted process would find.
#[derive(Clone, Debug, Default)]
pub struct MemoryMarkerStore(FlagMap);
impl MemoryMarkerStore {
	/// Returns the flag synchronously; absent keys read as `false`.
	pub fn get(&self, key: &str) -> bool {
		self.0.read().get(key).copied().unwrap_or(false)
	}

	/// Sets the flag synchronously.
	pub fn set(&self, key: &str, value: bool) {
		self.0.write().insert(key.to_owned(), value);
	}
}
impl MarkerStore for MemoryMarkerStore {
	fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
		let value = self.get(key);

		Box::pin(async move { Ok(value) })
	}

	fn store<'a>(&'a self, key: &'a str, value: bool) -> StoreFuture<'a, ()> {
		Box::pin(async move {
			self.set(key, value);

			Ok(())
		})
	}
}
