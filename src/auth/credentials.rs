//! Credential sets returned by negotiation. A set is replaced wholesale, never patched.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 1.0 access token and token secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth1Credentials {
	/// Access token (`oauth_token`).
	pub token: TokenSecret,
	/// Token secret (`oauth_token_secret`).
	pub token_secret: TokenSecret,
	/// Any additional fields the provider returned alongside the token.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub extra: BTreeMap<String, String>,
}
impl OAuth1Credentials {
	/// Creates a credential set from a token and its secret.
	pub fn new(token: impl Into<String>, token_secret: impl Into<String>) -> Self {
		Self {
			token: TokenSecret::new(token),
			token_secret: TokenSecret::new(token_secret),
			extra: BTreeMap::new(),
		}
	}

	/// Attaches an extra provider field.
	pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.extra.insert(key.into(), value.into());

		self
	}
}
impl Debug for OAuth1Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth1Credentials")
			.field("token", &"<redacted>")
			.field("token_secret", &"<redacted>")
			.field("extra", &self.extra.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// OAuth 2.0 access token with optional refresh token and expiry.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2Credentials {
	/// Access token presented on requests.
	pub access_token: TokenSecret,
	/// Refresh token, when the provider issued one.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Absolute expiry instant, stored as a unix timestamp.
	#[serde(default, with = "time::serde::timestamp::option")]
	pub expires_at: Option<OffsetDateTime>,
	/// Token type reported by the provider (usually `bearer`).
	#[serde(default)]
	pub token_type: Option<String>,
}
impl OAuth2Credentials {
	/// Creates a credential set holding only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			expires_at: None,
			token_type: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to the current clock, as reported by `expires_in`.
	pub fn with_expires_in(self, duration: Duration) -> Self {
		self.with_expires_at(OffsetDateTime::now_utc() + duration)
	}

	/// Records the provider-reported token type.
	pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Returns `true` if the token has an expiry at or before `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}

	/// Returns `true` if a refresh token is available.
	pub fn can_refresh(&self) -> bool {
		self.refresh_token.as_ref().is_some_and(|secret| !secret.is_empty())
	}
}
impl Debug for OAuth2Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Credentials")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("expires_at", &self.expires_at)
			.field("token_type", &self.token_type)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	#[test]
	fn expiry_checks_use_absolute_instant() {
		let credentials = OAuth2Credentials::new("access")
			.with_expires_at(macros::datetime!(2025-01-01 01:00 UTC));

		assert!(!credentials.is_expired_at(macros::datetime!(2025-01-01 00:59 UTC)));
		assert!(credentials.is_expired_at(macros::datetime!(2025-01-01 01:00 UTC)));
		assert!(!OAuth2Credentials::new("access").is_expired(), "No expiry means never expired.");
	}

	#[test]
	fn refresh_capability_requires_non_empty_token() {
		assert!(!OAuth2Credentials::new("a").can_refresh());
		assert!(!OAuth2Credentials::new("a").with_refresh_token("").can_refresh());
		assert!(OAuth2Credentials::new("a").with_refresh_token("r").can_refresh());
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let oauth1 =
			OAuth1Credentials::new("tok-9f2c", "sec-77ab").with_extra("user_id", "42");
		let oauth2 = OAuth2Credentials::new("abc123").with_refresh_token("ref-5e1d");
		let oauth1_debug = format!("{oauth1:?}");
		let oauth2_debug = format!("{oauth2:?}");

		assert!(!oauth1_debug.contains("tok-9f2c"));
		assert!(!oauth1_debug.contains("sec-77ab"));
		assert!(!oauth2_debug.contains("abc123"));
		assert!(!oauth2_debug.contains("ref-5e1d"));
	}

	#[test]
	fn expiry_round_trips_as_timestamp() {
		let credentials = OAuth2Credentials::new("access")
			.with_expires_at(macros::datetime!(2025-01-01 00:00 UTC));
		let value = serde_json::to_value(&credentials).expect("Credentials should serialize.");

		assert_eq!(value["expires_at"], 1_735_689_600);

		let back: OAuth2Credentials =
			serde_json::from_value(value).expect("Credentials should deserialize.");

		assert_eq!(back, credentials);
	}
}
