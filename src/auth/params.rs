//! Variant-specific token parameters. Parameters are part of a token's cache fingerprint.

// self
use crate::{_prelude::*, auth::ScopeSet};

/// OAuth 1.0 request signature method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureMethod {
	/// `HMAC-SHA1`, as defined by RFC 5849 §3.4.2.
	#[default]
	#[serde(rename = "HMAC-SHA1")]
	HmacSha1,
	/// `HMAC-SHA256`, for providers that advertise it.
	#[serde(rename = "HMAC-SHA256")]
	HmacSha256,
}
impl SignatureMethod {
	/// Value sent in `oauth_signature_method`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::HmacSha1 => "HMAC-SHA1",
			Self::HmacSha256 => "HMAC-SHA256",
		}
	}
}
impl FromStr for SignatureMethod {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"HMAC-SHA1" => Ok(Self::HmacSha1),
			"HMAC-SHA256" => Ok(Self::HmacSha256),
			other => Err(format!("unsupported signature method `{other}`")),
		}
	}
}
impl Display for SignatureMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Parameters for OAuth 1.0 tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OAuth1Params {
	/// Permission level requested from the provider (e.g. `read`, `write`), when supported.
	pub permission: Option<String>,
	/// How requests are signed.
	#[serde(default)]
	pub signature_method: SignatureMethod,
}
impl OAuth1Params {
	/// Requests a specific permission level.
	pub fn with_permission(permission: impl Into<String>) -> Self {
		Self { permission: Some(permission.into()), ..Self::default() }
	}

	/// Overrides the signature method.
	pub fn with_signature_method(mut self, signature_method: SignatureMethod) -> Self {
		self.signature_method = signature_method;

		self
	}
}

/// Where an OAuth 2.0 access token is placed on outgoing requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenDelivery {
	/// `Authorization: Bearer <token>` header.
	#[default]
	Header,
	/// `access_token` query parameter.
	Query,
}
impl TokenDelivery {
	/// Maps the boolean `as_header` switch onto a delivery mode.
	pub fn from_as_header(as_header: bool) -> Self {
		if as_header { Self::Header } else { Self::Query }
	}

	/// Returns `true` for header delivery.
	pub fn as_header(self) -> bool {
		matches!(self, Self::Header)
	}
}

/// Parameters for OAuth 2.0 tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OAuth2Params {
	/// Requested permission scope.
	pub scope: ScopeSet,
	/// Provider-specific response type, passed through to negotiation.
	#[serde(rename = "type")]
	pub kind: Option<String>,
	/// Use the out-of-band flow (code pasted by the user) instead of a local redirect.
	pub use_oob: bool,
	/// How the access token is attached when signing.
	pub delivery: TokenDelivery,
}
impl OAuth2Params {
	/// Creates parameters for the given scope with header delivery and no out-of-band flow.
	pub fn new(scope: ScopeSet) -> Self {
		Self { scope, ..Self::default() }
	}

	/// Sets the provider-specific response type.
	pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
		self.kind = Some(kind.into());

		self
	}

	/// Toggles the out-of-band flow.
	pub fn with_oob(mut self, use_oob: bool) -> Self {
		self.use_oob = use_oob;

		self
	}

	/// Overrides the token delivery mode.
	pub fn with_delivery(mut self, delivery: TokenDelivery) -> Self {
		self.delivery = delivery;

		self
	}
}
