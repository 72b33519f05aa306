//! Per-process caching decision handed to tokens.

// self
use crate::{
	_prelude::*,
	store::{CredentialStore, MemoryStore, StoreError},
	token::{CachedToken, Fingerprint},
};

/// What a token adopts from a cache hit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheHit {
	/// Replace endpoint, application, parameters, and credentials with the cached state.
	#[default]
	AdoptState,
	/// Keep the caller's endpoint, application, and parameters; adopt only the credentials.
	AdoptCredentials,
}

/// Store handle plus the resolved caching policy.
///
/// A disabled cache never calls into its store.
#[derive(Clone)]
pub struct TokenCache {
	store: Arc<dyn CredentialStore>,
	enabled: bool,
	on_hit: CacheHit,
}
impl TokenCache {
	/// Enables caching against `store`.
	pub fn new(store: Arc<dyn CredentialStore>) -> Self {
		Self { store, enabled: true, on_hit: CacheHit::default() }
	}

	/// A cache that never reads or writes.
	pub fn disabled() -> Self {
		Self { store: Arc::new(MemoryStore::default()), enabled: false, on_hit: CacheHit::default() }
	}

	/// Overrides whether the cache is used.
	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;

		self
	}

	/// Overrides the cache-hit policy.
	pub fn with_hit_policy(mut self, on_hit: CacheHit) -> Self {
		self.on_hit = on_hit;

		self
	}

	/// Returns `true` if tokens should read and write this cache.
	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	/// Cache-hit policy.
	pub fn on_hit(&self) -> CacheHit {
		self.on_hit
	}

	pub(crate) fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedToken>, StoreError> {
		if !self.enabled {
			return Ok(None);
		}

		self.store.lookup(fingerprint)
	}

	pub(crate) fn store(&self, fingerprint: &Fingerprint, token: CachedToken) -> Result<(), StoreError> {
		if !self.enabled {
			return Ok(());
		}

		self.store.store(fingerprint, token)
	}

	pub(crate) fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
		if !self.enabled {
			return Ok(false);
		}

		self.store.remove(fingerprint)
	}
}
impl Debug for TokenCache {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCache")
			.field("enabled", &self.enabled)
			.field("on_hit", &self.on_hit)
			.finish()
	}
}
