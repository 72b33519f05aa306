//! OAuth 2.0 variant: bearer signing and refresh.

// self
use crate::{
	_prelude::*,
	auth::{Application, Endpoint, OAuth2Credentials, OAuth2Params, TokenDelivery},
	error::RefreshError,
	negotiate::{NegotiationError, Negotiator},
	token::{CachedToken, Protocol, RequestConfig, SignedRequest, Token, TokenState},
};

/// Query parameter used when the token travels in the URL.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// OAuth 2.0 marker; see [`Protocol`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OAuth2;
impl Protocol for OAuth2 {
	type Credentials = OAuth2Credentials;
	type Params = OAuth2Params;

	const NAME: &'static str = "oauth2";
	const REFRESHABLE: bool = true;

	fn acquire(
		negotiator: &dyn Negotiator,
		endpoint: &Endpoint,
		app: &Application,
		params: &Self::Params,
	) -> Result<Self::Credentials, NegotiationError> {
		negotiator.negotiate_oauth2(
			endpoint,
			app,
			&params.scope,
			params.kind.as_deref(),
			params.use_oob,
		)
	}

	fn validate(credentials: &Self::Credentials) -> Result<(), NegotiationError> {
		if credentials.access_token.is_empty() {
			return Err(NegotiationError::InvalidResponse {
				message: "access_token is empty".into(),
			});
		}

		Ok(())
	}

	fn sign(
		_app: &Application,
		params: &Self::Params,
		credentials: &Self::Credentials,
		_method: &str,
		url: &Url,
	) -> SignedRequest {
		let token = credentials.access_token.expose();

		match params.delivery {
			TokenDelivery::Header => SignedRequest::new(
				url.clone(),
				RequestConfig::default().with_header("Authorization", format!("Bearer {token}")),
			),
			TokenDelivery::Query =>
				SignedRequest::new(with_access_token(url, token), RequestConfig::default()),
		}
	}

	fn refresh(
		negotiator: &dyn Negotiator,
		endpoint: &Endpoint,
		app: &Application,
		credentials: &Self::Credentials,
	) -> Result<Self::Credentials> {
		if !credentials.can_refresh() {
			return Err(RefreshError::MissingRefreshToken.into());
		}

		let mut refreshed = negotiator
			.renegotiate_oauth2(endpoint, app, credentials)
			.and_then(|refreshed| Self::validate(&refreshed).map(|()| refreshed))
			.map_err(|source| RefreshError::Rejected { source })?;

		// Providers may omit the refresh token when it is not rotated.
		if refreshed.refresh_token.is_none() {
			refreshed.refresh_token = credentials.refresh_token.clone();
		}

		Ok(refreshed)
	}

	fn can_refresh(credentials: &Self::Credentials) -> bool {
		credentials.can_refresh()
	}

	fn wrap(state: TokenState<Self>) -> CachedToken {
		CachedToken::OAuth2(state)
	}

	fn unwrap(cached: CachedToken) -> Option<TokenState<Self>> {
		match cached {
			CachedToken::OAuth2(state) => Some(state),
			_ => None,
		}
	}
}
impl Token<OAuth2> {
	/// Returns `true` if the credentials carry an expiry that has passed.
	pub fn is_expired(&self) -> bool {
		self.credentials().is_some_and(OAuth2Credentials::is_expired)
	}
}

// Works on the raw query so untouched parameters keep their original encoding.
fn with_access_token(url: &Url, token: &str) -> Url {
	let token_pair = format!("{ACCESS_TOKEN_PARAM}={}", urlencoding::encode(token));
	let query = url
		.query()
		.unwrap_or_default()
		.split('&')
		.filter(|segment| !segment.is_empty() && !is_access_token(segment))
		.chain([token_pair.as_str()])
		.collect::<Vec<_>>()
		.join("&");
	let mut signed = url.clone();

	signed.set_query(Some(&query));

	signed
}

fn is_access_token(segment: &str) -> bool {
	let key = segment.split_once('=').map_or(segment, |(key, _)| key);

	urlencoding::decode(&key.replace('+', " ")).is_ok_and(|key| key == ACCESS_TOKEN_PARAM)
}
