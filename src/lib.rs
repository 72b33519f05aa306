//! OAuth 1.0 and 2.0 credential lifecycle for HTTP clients: acquire credentials through a
//! pluggable negotiator, cache them across process invocations under a stable fingerprint, sign
//! outgoing requests, and refresh expired 2.0 credentials.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod ext;
pub mod negotiate;
pub mod obs;
pub mod store;
pub mod token;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::{
		collections::VecDeque,
		env,
		path::PathBuf,
		process,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use crate::{
		auth::{Application, Endpoint, OAuth1Credentials, OAuth2Credentials, ScopeSet},
		negotiate::{NegotiationError, Negotiator},
		store::{CredentialStore, MemoryStore, StoreError},
		token::{CachedToken, Fingerprint},
	};

	type Scripted<T> = Mutex<VecDeque<Result<T, NegotiationError>>>;

	/// Scripted [`Negotiator`] that replays queued results and counts every call.
	#[derive(Debug, Default)]
	pub struct MockNegotiator {
		oauth1: Scripted<OAuth1Credentials>,
		oauth2: Scripted<OAuth2Credentials>,
		refresh: Scripted<OAuth2Credentials>,
		/// Number of `negotiate_oauth1` calls observed.
		pub oauth1_calls: AtomicUsize,
		/// Number of `negotiate_oauth2` calls observed.
		pub oauth2_calls: AtomicUsize,
		/// Number of `renegotiate_oauth2` calls observed.
		pub refresh_calls: AtomicUsize,
	}
	impl MockNegotiator {
		/// Queues a result for the next OAuth 1.0 negotiation.
		pub fn push_oauth1(&self, result: Result<OAuth1Credentials, NegotiationError>) -> &Self {
			self.oauth1.lock().push_back(result);

			self
		}

		/// Queues a result for the next OAuth 2.0 negotiation.
		pub fn push_oauth2(&self, result: Result<OAuth2Credentials, NegotiationError>) -> &Self {
			self.oauth2.lock().push_back(result);

			self
		}

		/// Queues a result for the next OAuth 2.0 refresh.
		pub fn push_refresh(&self, result: Result<OAuth2Credentials, NegotiationError>) -> &Self {
			self.refresh.lock().push_back(result);

			self
		}

		/// Total number of acquisition calls (both variants, refresh excluded).
		pub fn acquisitions(&self) -> usize {
			self.oauth1_calls.load(Ordering::SeqCst) + self.oauth2_calls.load(Ordering::SeqCst)
		}

		fn next<T>(queue: &Scripted<T>) -> Result<T, NegotiationError> {
			queue.lock().pop_front().unwrap_or_else(|| {
				Err(NegotiationError::Rejected { reason: "no scripted response queued".into() })
			})
		}
	}
	impl Negotiator for MockNegotiator {
		fn negotiate_oauth1(
			&self,
			_endpoint: &Endpoint,
			_app: &Application,
			_permission: Option<&str>,
		) -> Result<OAuth1Credentials, NegotiationError> {
			self.oauth1_calls.fetch_add(1, Ordering::SeqCst);

			Self::next(&self.oauth1)
		}

		fn negotiate_oauth2(
			&self,
			_endpoint: &Endpoint,
			_app: &Application,
			_scope: &ScopeSet,
			_kind: Option<&str>,
			_use_oob: bool,
		) -> Result<OAuth2Credentials, NegotiationError> {
			self.oauth2_calls.fetch_add(1, Ordering::SeqCst);

			Self::next(&self.oauth2)
		}

		fn renegotiate_oauth2(
			&self,
			_endpoint: &Endpoint,
			_app: &Application,
			_credentials: &OAuth2Credentials,
		) -> Result<OAuth2Credentials, NegotiationError> {
			self.refresh_calls.fetch_add(1, Ordering::SeqCst);

			Self::next(&self.refresh)
		}
	}

	/// [`CredentialStore`] wrapper that counts lookups and writes and can be told to fail writes.
	#[derive(Debug, Default)]
	pub struct CountingStore {
		inner: MemoryStore,
		/// Number of `lookup` calls observed.
		pub lookups: AtomicUsize,
		/// Number of `store` calls observed.
		pub writes: AtomicUsize,
		/// Rejects every write with a backend error when set.
		pub fail_writes: bool,
	}
	impl CountingStore {
		/// Builds a store whose writes always fail.
		pub fn failing() -> Self {
			Self { fail_writes: true, ..Self::default() }
		}

		/// Returns the number of writes observed so far.
		pub fn write_count(&self) -> usize {
			self.writes.load(Ordering::SeqCst)
		}

		/// Returns the number of lookups observed so far.
		pub fn lookup_count(&self) -> usize {
			self.lookups.load(Ordering::SeqCst)
		}
	}
	impl CredentialStore for CountingStore {
		fn lookup(&self, fingerprint: &Fingerprint) -> Result<Option<CachedToken>, StoreError> {
			self.lookups.fetch_add(1, Ordering::SeqCst);
			self.inner.lookup(fingerprint)
		}

		fn store(&self, fingerprint: &Fingerprint, token: CachedToken) -> Result<(), StoreError> {
			self.writes.fetch_add(1, Ordering::SeqCst);

			if self.fail_writes {
				return Err(StoreError::Backend { message: "cache file is read-only".into() });
			}

			self.inner.store(fingerprint, token)
		}

		fn remove(&self, fingerprint: &Fingerprint) -> Result<bool, StoreError> {
			self.inner.remove(fingerprint)
		}
	}

	/// Provider endpoint fixture shared by tests.
	pub fn test_endpoint() -> Endpoint {
		Endpoint::builder()
			.request(url("https://provider.example.com/oauth/request_token"))
			.authorize(url("https://provider.example.com/oauth/authorize"))
			.access(url("https://provider.example.com/oauth/access_token"))
			.build()
			.expect("Endpoint fixture should build.")
	}

	/// Application fixture shared by tests.
	pub fn test_app() -> Application {
		Application::new("demo-app", "consumer-key").with_secret("consumer-secret")
	}

	/// Parses a URL fixture.
	pub fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	/// Returns a unique path in the system temp directory.
	pub fn temp_path(label: &str) -> PathBuf {
		let unique = format!(
			"oauth_credentials_{label}_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use color_eyre as _;
