//! Thread-safe in-memory [`CredentialStore`] for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, StoreError},
	token::{CachedToken, Fingerprint},
};

/// Keeps cached state in-process; contents vanish with the process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(Arc<RwLock<BTreeMap<Fingerprint, CachedToken>>>);
impl MemoryStore {
	/// Number of cached entries.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` if nothing is cached.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl CredentialStore for MemoryStore {
	fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedToken>, StoreError> {
		Ok(self.0.read().get(fingerprint).cloned())
	}

	fn store(&self, fingerprint: &Fingerprint, token: CachedToken) -> Result<(), StoreError> {
		self.0.write().insert(fingerprint.clone(), token);

		Ok(())
	}

	fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
		Ok(self.0.write().remove(fingerprint).is_some())
	}
}
