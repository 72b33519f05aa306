//! Endpoint negotiation contract.
//!
//! The handshake itself (request-token exchange, browser authorization, code exchange, refresh
//! grant) lives outside this crate. Callers plug in a [`Negotiator`] and tokens delegate every
//! network round-trip to it. Implementations block until the provider answers; cancellation and
//! timeouts are theirs to enforce.

// self
use crate::{
	_prelude::*,
	auth::{Application, Endpoint, OAuth1Credentials, OAuth2Credentials, ScopeSet},
};

type BoxError = Box<dyn StdError + Send + Sync>;

/// Failure reported by a [`Negotiator`].
#[derive(Debug, ThisError)]
pub enum NegotiationError {
	/// Provider refused the request (denied consent, invalid grant, bad client, ...).
	#[error("Provider rejected the request: {reason}.")]
	Rejected {
		/// Provider- or negotiator-supplied reason string.
		reason: String,
	},
	/// Provider answered with something that is not a usable credential set.
	#[error("Provider returned an invalid response: {message}.")]
	InvalidResponse {
		/// Description of what was wrong with the response.
		message: String,
	},
	/// Network or I/O failure while talking to the provider.
	#[error("Transport failure during negotiation.")]
	Transport {
		/// Underlying transport error.
		#[source]
		source: BoxError,
	},
}
impl NegotiationError {
	/// Wraps a transport-specific failure.
	pub fn transport(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Performs the provider handshakes on behalf of tokens.
pub trait Negotiator
where
	Self: Send + Sync,
{
	/// Runs the OAuth 1.0 dance and returns the resulting access token + secret.
	fn negotiate_oauth1(
		&self,
		endpoint: &Endpoint,
		app: &Application,
		permission: Option<&str>,
	) -> Result<OAuth1Credentials, NegotiationError>;

	/// Runs the OAuth 2.0 authorization flow and returns the resulting credential set.
	fn negotiate_oauth2(
		&self,
		endpoint: &Endpoint,
		app: &Application,
		scope: &ScopeSet,
		kind: Option<&str>,
		use_oob: bool,
	) -> Result<OAuth2Credentials, NegotiationError>;

	/// Exchanges the current credential set for a fresh one.
	fn renegotiate_oauth2(
		&self,
		endpoint: &Endpoint,
		app: &Application,
		credentials: &OAuth2Credentials,
	) -> Result<OAuth2Credentials, NegotiationError>;
}
