//! OAuth 1.0 variant: HMAC request signing over the consumer and token secrets.
//!
//! Signatures follow RFC 5849 §3.4. `HMAC-SHA1` is the default signature method; `HMAC-SHA256`
//! is available through [`OAuth1Params::signature_method`]. The nonce and timestamp are generated
//! per call; everything else is a pure function of the inputs, exposed through
//! [`authorization_header`] and [`verify`].

// std
use std::borrow::Cow;
// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac, digest::KeyInit};
use rand::{Rng, distr::Alphanumeric};
use sha1::Sha1;
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	auth::{Application, Endpoint, OAuth1Credentials, OAuth1Params, SignatureMethod},
	negotiate::{NegotiationError, Negotiator},
	token::{CachedToken, Protocol, RequestConfig, SignedRequest, TokenState},
};

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 32;
const OAUTH_VERSION: &str = "1.0";

/// OAuth 1.0 marker; see [`Protocol`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OAuth1;
impl Protocol for OAuth1 {
	type Credentials = OAuth1Credentials;
	type Params = OAuth1Params;

	const NAME: &'static str = "oauth1";
	const REFRESHABLE: bool = false;

	fn acquire(
		negotiator: &dyn Negotiator,
		endpoint: &Endpoint,
		app: &Application,
		params: &Self::Params,
	) -> Result<Self::Credentials, NegotiationError> {
		negotiator.negotiate_oauth1(endpoint, app, params.permission.as_deref())
	}

	fn validate(credentials: &Self::Credentials) -> Result<(), NegotiationError> {
		if credentials.token.is_empty() {
			return Err(NegotiationError::InvalidResponse {
				message: "oauth_token is empty".into(),
			});
		}

		Ok(())
	}

	fn sign(
		app: &Application,
		params: &Self::Params,
		credentials: &Self::Credentials,
		method: &str,
		url: &Url,
	) -> SignedRequest {
		let timestamp = OffsetDateTime::now_utc().unix_timestamp();
		let header = authorization_header(
			method,
			url,
			app,
			credentials,
			params.signature_method,
			&nonce(),
			timestamp,
		);
		let config = RequestConfig::default().with_header("Authorization", header);

		SignedRequest::new(url.clone(), config)
	}

	fn refresh(
		_negotiator: &dyn Negotiator,
		_endpoint: &Endpoint,
		_app: &Application,
		_credentials: &Self::Credentials,
	) -> Result<Self::Credentials> {
		Err(Error::UnsupportedOperation { operation: "refresh", protocol: Self::NAME })
	}

	fn can_refresh(_credentials: &Self::Credentials) -> bool {
		false
	}

	fn wrap(state: TokenState<Self>) -> CachedToken {
		CachedToken::OAuth1(state)
	}

	fn unwrap(cached: CachedToken) -> Option<TokenState<Self>> {
		match cached {
			CachedToken::OAuth1(state) => Some(state),
			_ => None,
		}
	}
}

/// Builds the `Authorization: OAuth ...` header value for a fixed nonce and timestamp.
pub fn authorization_header(
	method: &str,
	url: &Url,
	app: &Application,
	credentials: &OAuth1Credentials,
	signature_method: SignatureMethod,
	nonce: &str,
	timestamp: i64,
) -> String {
	let mut oauth_params = protocol_params(app, credentials, signature_method, nonce, timestamp);
	let base = signature_base_string(method, url, &oauth_params);
	let key = signing_key(app, credentials);
	let signature = match signature_method {
		SignatureMethod::HmacSha1 =>
			STANDARD.encode(keyed_mac::<HmacSha1>(&key, &base).finalize().into_bytes()),
		SignatureMethod::HmacSha256 =>
			STANDARD.encode(keyed_mac::<HmacSha256>(&key, &base).finalize().into_bytes()),
	};

	oauth_params.push(("oauth_signature".into(), signature));
	oauth_params.sort();

	let fields = oauth_params
		.iter()
		.map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
		.collect::<Vec<_>>()
		.join(", ");

	format!("OAuth {fields}")
}

/// Checks an `Authorization` header produced by [`authorization_header`] against the request.
///
/// The nonce, timestamp, and signature method are taken from the header itself; freshness is the
/// server's concern.
pub fn verify(
	method: &str,
	url: &Url,
	app: &Application,
	credentials: &OAuth1Credentials,
	header: &str,
) -> bool {
	let Some(fields) = parse_header(header) else {
		return false;
	};
	let field = |name: &str| fields.get(name).map(String::as_str);
	let (Some(signature), Some(nonce), Some(timestamp), Some(signature_method)) = (
		field("oauth_signature"),
		field("oauth_nonce"),
		field("oauth_timestamp"),
		field("oauth_signature_method"),
	) else {
		return false;
	};
	let (Ok(timestamp), Ok(signature_method)) =
		(timestamp.parse::<i64>(), signature_method.parse::<SignatureMethod>())
	else {
		return false;
	};
	let Ok(expected) = STANDARD.decode(signature) else {
		return false;
	};

	if field("oauth_token") != Some(credentials.token.expose())
		|| field("oauth_consumer_key") != Some(app.key.as_str())
	{
		return false;
	}

	let oauth_params = protocol_params(app, credentials, signature_method, nonce, timestamp);
	let base = signature_base_string(method, url, &oauth_params);
	let key = signing_key(app, credentials);
	let verified = match signature_method {
		SignatureMethod::HmacSha1 => keyed_mac::<HmacSha1>(&key, &base).verify_slice(&expected),
		SignatureMethod::HmacSha256 =>
			keyed_mac::<HmacSha256>(&key, &base).verify_slice(&expected),
	};

	verified.is_ok()
}

/// Signature base string (RFC 5849 §3.4.1): method, base URI, and the normalized parameters.
pub fn signature_base_string(method: &str, url: &Url, oauth_params: &[(String, String)]) -> String {
	let mut base_uri = url.clone();

	base_uri.set_query(None);
	base_uri.set_fragment(None);

	let mut params = url
		.query_pairs()
		.map(|(k, v)| (encode(&k).into_owned(), encode(&v).into_owned()))
		.chain(oauth_params.iter().map(|(k, v)| (encode(k).into_owned(), encode(v).into_owned())))
		.collect::<Vec<_>>();

	params.sort();

	let normalized =
		params.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		encode(base_uri.as_str()),
		encode(&normalized)
	)
}

fn protocol_params(
	app: &Application,
	credentials: &OAuth1Credentials,
	signature_method: SignatureMethod,
	nonce: &str,
	timestamp: i64,
) -> Vec<(String, String)> {
	vec![
		("oauth_consumer_key".into(), app.key.clone()),
		("oauth_nonce".into(), nonce.to_owned()),
		("oauth_signature_method".into(), signature_method.as_str().into()),
		("oauth_timestamp".into(), timestamp.to_string()),
		("oauth_token".into(), credentials.token.expose().to_owned()),
		("oauth_version".into(), OAUTH_VERSION.into()),
	]
}

fn signing_key(app: &Application, credentials: &OAuth1Credentials) -> String {
	format!("{}&{}", encode(app.secret_str()), encode(credentials.token_secret.expose()))
}

fn keyed_mac<M>(key: &str, base: &str) -> M
where
	M: Mac + KeyInit,
{
	let mut mac =
		<M as Mac>::new_from_slice(key.as_bytes()).expect("HMAC can take key of any size");

	mac.update(base.as_bytes());

	mac
}

fn parse_header(header: &str) -> Option<BTreeMap<String, String>> {
	let fields = header.strip_prefix("OAuth ")?;
	let mut parsed = BTreeMap::new();

	for field in fields.split(',') {
		let (key, value) = field.trim().split_once('=')?;
		let value = value.strip_prefix('"')?.strip_suffix('"')?;

		parsed.insert(key.to_owned(), urlencoding::decode(value).ok()?.into_owned());
	}

	Some(parsed)
}

// RFC 3986 unreserved characters pass through; everything else is percent-encoded.
fn encode(value: &str) -> Cow<'_, str> {
	urlencoding::encode(value)
}

fn nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
