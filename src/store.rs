//! Durable storage for the explicit-logout marker.
//!
//! The access token is never persisted; the only state that survives a restart is a single
//! boolean flag recording that the user logged out on purpose, which keeps a leftover refresh
//! cookie from silently re-authenticating them on the next start.

pub mod file;
pub mod memory;

pub use file::FileMarkerStore;
pub use memory::MemoryMarkerStore;

// self
use crate::_prelude::*;

/// Boxed future returned by [`MarkerStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Key-value flag storage implemented by marker backends.
pub trait MarkerStore
where
	Self: Send + Sync,
{
	/// Reads the flag stored under `key`; absent keys read as `false`.
	fn load<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool>;

	/// Persists `value` under `key`.
	fn store<'a>(&'a self, key: &'a str, value: bool) -> StoreFuture<'a, ()>;
}

/// Error type produced by [`MarkerStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
