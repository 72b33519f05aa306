//! Credential store contract and the built-in file and memory backends.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	token::{CachedToken, Fingerprint},
};

/// Persistence contract for cached token state, keyed by [`Fingerprint`].
///
/// Calls block until the backend finishes. Concurrent writers to the same fingerprint race with
/// last-write-wins semantics.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Fetches the state cached under `fingerprint`, if any.
	fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedToken>, StoreError>;

	/// Persists or replaces the state cached under `fingerprint`.
	fn store(&self, fingerprint: &Fingerprint, token: CachedToken) -> Result<(), StoreError>;

	/// Drops the entry for `fingerprint`, returning whether one existed.
	fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Cached data could not be encoded or decoded.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure (I/O, permissions, ...).
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
