//! Token lifecycle: cache lookup, acquisition, persistence, signing, and refresh.
//!
//! A [`Token`] is generic over a sealed [`Protocol`], whose only implementations are
//! [`OAuth1`] and [`OAuth2`]. The protocol supplies acquisition, signing, and refresh; the token
//! owns the state machine around them:
//!
//! 1. `init` returns early if credentials are already present (unless forced).
//! 2. Otherwise, when caching is enabled, the [`TokenCache`] is consulted under the token's
//!    [`Fingerprint`].
//! 3. On a miss the protocol negotiates fresh credentials, which are then written back.
//!
//! Credentials are only ever replaced inside `init` and `refresh`. Cache writes are best-effort
//! during both: failures are reported through [`obs::report_cache_failure`] and swallowed.

pub mod oauth1;
pub mod oauth2;

mod fingerprint;
mod request;

pub use fingerprint::Fingerprint;
pub use oauth1::OAuth1;
pub use oauth2::OAuth2;
pub use request::{RequestConfig, SignedRequest};

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{Application, Endpoint, OAuth1Params, OAuth2Params},
	cache::{CacheHit, TokenCache},
	error::ConfigError,
	negotiate::{NegotiationError, Negotiator},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

mod sealed {
	pub trait Sealed {}

	impl Sealed for super::OAuth1 {}
	impl Sealed for super::OAuth2 {}
}

/// Variant-specific behaviour plugged into [`Token`].
pub trait Protocol
where
	Self: 'static + sealed::Sealed + Sized + Send + Sync + Clone + Debug + PartialEq,
{
	/// Stable variant label used in fingerprints, cache files, and errors.
	const NAME: &'static str;
	/// Whether credentials of this variant can be refreshed in place.
	const REFRESHABLE: bool;

	/// Variant parameters; part of the fingerprint.
	type Params: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;
	/// Credential set produced by negotiation.
	type Credentials: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync;

	/// Obtains fresh credentials from the negotiator.
	fn acquire(
		negotiator: &dyn Negotiator,
		endpoint: &Endpoint,
		app: &Application,
		params: &Self::Params,
	) -> Result<Self::Credentials, NegotiationError>;

	/// Rejects credential sets that cannot be used for signing.
	fn validate(credentials: &Self::Credentials) -> Result<(), NegotiationError>;

	/// Produces the signed request description for `method` + `url`.
	fn sign(
		app: &Application,
		params: &Self::Params,
		credentials: &Self::Credentials,
		method: &str,
		url: &Url,
	) -> SignedRequest;

	/// Exchanges `credentials` for a replacement set.
	fn refresh(
		negotiator: &dyn Negotiator,
		endpoint: &Endpoint,
		app: &Application,
		credentials: &Self::Credentials,
	) -> Result<Self::Credentials>;

	/// Returns `true` if `credentials` carry what `refresh` needs.
	fn can_refresh(credentials: &Self::Credentials) -> bool;

	/// Tags a state snapshot for persistence.
	fn wrap(state: TokenState<Self>) -> CachedToken;

	/// Extracts a state snapshot of this variant, or `None` for another variant's entry.
	fn unwrap(cached: CachedToken) -> Option<TokenState<Self>>;
}

/// Complete snapshot of an initialized token, as persisted by stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TokenState<P>
where
	P: Protocol,
{
	/// Provider endpoint.
	pub endpoint: Endpoint,
	/// Client application.
	pub app: Application,
	/// Variant parameters.
	pub params: P::Params,
	/// Credential set.
	pub credentials: P::Credentials,
}

/// Variant-tagged cache entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum CachedToken {
	/// OAuth 1.0 state.
	#[serde(rename = "oauth1")]
	OAuth1(TokenState<OAuth1>),
	/// OAuth 2.0 state.
	#[serde(rename = "oauth2")]
	OAuth2(TokenState<OAuth2>),
}
impl CachedToken {
	/// Variant label of the entry.
	pub fn variant(&self) -> &'static str {
		match self {
			Self::OAuth1(_) => OAuth1::NAME,
			Self::OAuth2(_) => OAuth2::NAME,
		}
	}
}

/// OAuth credential holder for one endpoint/application/parameter combination.
///
/// Tokens are not internally synchronized: `init` and `refresh` take `&mut self`, while `sign`
/// only reads and can be shared freely once the token is initialized.
#[derive(Clone)]
pub struct Token<P>
where
	P: Protocol,
{
	endpoint: Endpoint,
	app: Application,
	params: P::Params,
	credentials: Option<P::Credentials>,
	negotiator: Arc<dyn Negotiator>,
	cache: TokenCache,
}
impl<P> Token<P>
where
	P: Protocol,
{
	/// Creates an uninitialized token. Call [`Token::init`] before signing.
	pub fn new(
		endpoint: Endpoint,
		app: Application,
		params: P::Params,
		negotiator: Arc<dyn Negotiator>,
		cache: TokenCache,
	) -> Self {
		Self { endpoint, app, params, credentials: None, negotiator, cache }
	}

	/// Creates a token from credentials the caller already holds; `init` becomes a no-op.
	pub fn with_credentials(
		state: TokenState<P>,
		negotiator: Arc<dyn Negotiator>,
		cache: TokenCache,
	) -> Self {
		let TokenState { endpoint, app, params, credentials } = state;

		Self { endpoint, app, params, credentials: Some(credentials), negotiator, cache }
	}

	/// Provider endpoint.
	pub fn endpoint(&self) -> &Endpoint {
		&self.endpoint
	}

	/// Client application.
	pub fn app(&self) -> &Application {
		&self.app
	}

	/// Variant parameters.
	pub fn params(&self) -> &P::Params {
		&self.params
	}

	/// Current credential set, if initialized.
	pub fn credentials(&self) -> Option<&P::Credentials> {
		self.credentials.as_ref()
	}

	/// Returns `true` once credentials are present.
	pub fn is_initialized(&self) -> bool {
		self.credentials.is_some()
	}

	/// Returns `true` if `refresh` has what it needs.
	pub fn can_refresh(&self) -> bool {
		P::REFRESHABLE && self.credentials.as_ref().is_some_and(P::can_refresh)
	}

	/// Snapshot of the full state, if initialized.
	pub fn state(&self) -> Option<TokenState<P>> {
		self.credentials.as_ref().map(|credentials| TokenState {
			endpoint: self.endpoint.clone(),
			app: self.app.clone(),
			params: self.params.clone(),
			credentials: credentials.clone(),
		})
	}

	/// Cache key for this token's endpoint + parameters.
	pub fn fingerprint(&self) -> Result<Fingerprint> {
		Ok(Fingerprint::compute::<P>(&self.endpoint, &self.params)?)
	}

	/// Populates credentials from memory, the cache, or a fresh negotiation.
	///
	/// Without `force`, an initialized token is returned untouched and the cache is consulted
	/// before negotiating. With `force`, the token always negotiates. On failure the previous
	/// credentials (if any) are kept.
	pub fn init(&mut self, force: bool) -> Result<&mut Self> {
		const KIND: FlowKind = FlowKind::Init;

		if !force && self.credentials.is_some() {
			return Ok(self);
		}

		let _span = FlowSpan::new(KIND, P::NAME).entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		if !force && self.load_cached() {
			obs::record_flow_outcome(KIND, FlowOutcome::Success);

			return Ok(self);
		}

		obs::trace_event(KIND, "acquire");

		let credentials =
			P::acquire(self.negotiator.as_ref(), &self.endpoint, &self.app, &self.params)
				.and_then(|credentials| P::validate(&credentials).map(|()| credentials))
				.map_err(|source| {
					obs::record_flow_outcome(KIND, FlowOutcome::Failure);

					Error::Acquisition { protocol: P::NAME, source }
				})?;

		self.credentials = Some(credentials);
		self.cache_best_effort(KIND);
		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		Ok(self)
	}

	/// Writes the full state to the cache. No-op when caching is disabled.
	pub fn cache(&self) -> Result<&Self> {
		if !self.cache.is_enabled() {
			return Ok(self);
		}

		let state = self.state().ok_or(Error::NotInitialized { operation: "cache" })?;

		self.cache.store(&self.fingerprint()?, P::wrap(state))?;

		Ok(self)
	}

	/// Removes this token's cache entry, returning whether one existed.
	pub fn uncache(&self) -> Result<bool> {
		if !self.cache.is_enabled() {
			return Ok(false);
		}

		Ok(self.cache.remove(&self.fingerprint()?)?)
	}

	/// Signs a request for `method` + `url`.
	pub fn sign(&self, method: &str, url: &Url) -> Result<SignedRequest> {
		let credentials =
			self.credentials.as_ref().ok_or(Error::NotInitialized { operation: "sign" })?;

		Ok(P::sign(&self.app, &self.params, credentials, method, url))
	}

	/// Parses `url` and signs it.
	pub fn sign_str(&self, method: &str, url: &str) -> Result<SignedRequest> {
		let parsed = Url::parse(url)
			.map_err(|source| ConfigError::InvalidUrl { url: url.to_owned(), source })?;

		self.sign(method, &parsed)
	}

	/// Replaces the credentials with a refreshed set and re-caches them.
	///
	/// Variants that cannot refresh fail with [`Error::UnsupportedOperation`] regardless of
	/// state. A failed refresh leaves the current credentials in place.
	pub fn refresh(&mut self) -> Result<&mut Self> {
		const KIND: FlowKind = FlowKind::Refresh;

		if !P::REFRESHABLE {
			return Err(Error::UnsupportedOperation { operation: "refresh", protocol: P::NAME });
		}

		let current =
			self.credentials.as_ref().ok_or(Error::NotInitialized { operation: "refresh" })?;
		let _span = FlowSpan::new(KIND, P::NAME).entered();

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let refreshed = P::refresh(self.negotiator.as_ref(), &self.endpoint, &self.app, current)
			.inspect_err(|_| obs::record_flow_outcome(KIND, FlowOutcome::Failure))?;

		self.credentials = Some(refreshed);
		self.cache_best_effort(KIND);
		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		Ok(self)
	}

	fn load_cached(&mut self) -> bool {
		const KIND: FlowKind = FlowKind::Init;

		if !self.cache.is_enabled() {
			return false;
		}

		let lookup =
			self.fingerprint().and_then(|fp| self.cache.lookup(&fp).map_err(Error::from));
		let cached = match lookup {
			Ok(cached) => cached,
			Err(e) => {
				obs::report_cache_failure(KIND, "lookup", &e);

				return false;
			},
		};
		let Some(state) = cached.and_then(P::unwrap) else {
			obs::trace_event(KIND, "cache_miss");

			return false;
		};

		if P::validate(&state.credentials).is_err() {
			obs::trace_event(KIND, "cache_invalid");

			return false;
		}

		obs::trace_event(KIND, "cache_hit");

		match self.cache.on_hit() {
			CacheHit::AdoptState => {
				let TokenState { endpoint, app, params, credentials } = state;

				self.endpoint = endpoint;
				self.app = app;
				self.params = params;
				self.credentials = Some(credentials);
			},
			CacheHit::AdoptCredentials => self.credentials = Some(state.credentials),
		}

		true
	}

	fn cache_best_effort(&self, kind: FlowKind) {
		if let Err(e) = self.cache() {
			obs::report_cache_failure(kind, "store", &e);
		}
	}
}
impl<P> Debug for Token<P>
where
	P: Protocol,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("variant", &P::NAME)
			.field("endpoint", &self.endpoint)
			.field("app", &self.app)
			.field("params", &self.params)
			.field("credentials", &self.credentials)
			.field("cache", &self.cache)
			.finish()
	}
}
impl<P> Display for Token<P>
where
	P: Protocol,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		writeln!(f, "<Token {}>", P::NAME)?;
		writeln!(f, "  endpoint: {}", self.endpoint)?;
		writeln!(f, "  app: {}", self.app)?;

		match self.fingerprint() {
			Ok(fp) => write!(f, "  fingerprint: {fp}"),
			Err(_) => write!(f, "  fingerprint: <unavailable>"),
		}
	}
}

/// Builds an OAuth 1.0 token and initializes it before returning.
pub fn new_oauth1_token(
	endpoint: Endpoint,
	app: Application,
	permission: Option<&str>,
	negotiator: Arc<dyn Negotiator>,
	cache: TokenCache,
) -> Result<Token<OAuth1>> {
	let params = OAuth1Params {
		permission: permission.map(ToOwned::to_owned),
		..OAuth1Params::default()
	};
	let mut token = Token::new(endpoint, app, params, negotiator, cache);

	token.init(false)?;

	Ok(token)
}

/// Builds an OAuth 2.0 token and initializes it before returning.
///
/// `params` carries the scope, provider response type, out-of-band switch, and the `as_header`
/// delivery mode.
pub fn new_oauth2_token(
	endpoint: Endpoint,
	app: Application,
	params: OAuth2Params,
	negotiator: Arc<dyn Negotiator>,
	cache: TokenCache,
) -> Result<Token<OAuth2>> {
	let mut token = Token::new(endpoint, app, params, negotiator, cache);

	token.init(false)?;

	Ok(token)
}
