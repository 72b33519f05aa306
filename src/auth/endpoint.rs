//! Provider endpoint descriptors and their builder.

// self
use crate::_prelude::*;

/// Errors raised while assembling an [`Endpoint`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum EndpointError {
	/// The authorization URL is required by every flow.
	#[error("Missing authorize endpoint.")]
	MissingAuthorize,
	/// The access-token URL is required by every flow.
	#[error("Missing access endpoint.")]
	MissingAccess,
	/// Extra endpoint names must be non-empty and free of whitespace.
	#[error("Extra endpoint name `{name}` is invalid.")]
	InvalidExtraName {
		/// Offending name.
		name: String,
	},
}

/// Immutable set of provider URLs for an OAuth flow.
///
/// OAuth 1.0 providers additionally expose a request-token URL; OAuth 2.0 providers leave it
/// unset. Any further provider URLs (validation, revocation, ...) go in `extras`, which is kept
/// sorted so the descriptor serializes deterministically.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
	/// Request-token URL (OAuth 1.0 only).
	pub request: Option<Url>,
	/// Authorization URL the resource owner is sent to.
	pub authorize: Url,
	/// Access-token URL.
	pub access: Url,
	/// Additional named provider URLs.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub extras: BTreeMap<String, Url>,
}
impl Endpoint {
	/// Creates a new builder.
	pub fn builder() -> EndpointBuilder {
		EndpointBuilder::default()
	}

	/// Looks up an extra endpoint by name.
	pub fn extra(&self, name: &str) -> Option<&Url> {
		self.extras.get(name)
	}
}
impl Display for Endpoint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match &self.request {
			Some(request) => write!(
				f,
				"request: {request} authorize: {} access: {}",
				self.authorize, self.access
			),
			None => write!(f, "authorize: {} access: {}", self.authorize, self.access),
		}
	}
}

/// Builder for [`Endpoint`] values.
#[derive(Debug, Default)]
pub struct EndpointBuilder {
	request: Option<Url>,
	authorize: Option<Url>,
	access: Option<Url>,
	extras: BTreeMap<String, Url>,
}
impl EndpointBuilder {
	/// Sets the request-token URL.
	pub fn request(mut self, url: Url) -> Self {
		self.request = Some(url);

		self
	}

	/// Sets the authorization URL.
	pub fn authorize(mut self, url: Url) -> Self {
		self.authorize = Some(url);

		self
	}

	/// Sets the access-token URL.
	pub fn access(mut self, url: Url) -> Self {
		self.access = Some(url);

		self
	}

	/// Adds (or replaces) a named extra URL.
	pub fn extra(mut self, name: impl Into<String>, url: Url) -> Self {
		self.extras.insert(name.into(), url);

		self
	}

	/// Consumes the builder and validates the resulting endpoint.
	pub fn build(self) -> Result<Endpoint, EndpointError> {
		let authorize = self.authorize.ok_or(EndpointError::MissingAuthorize)?;
		let access = self.access.ok_or(EndpointError::MissingAccess)?;

		if let Some(name) =
			self.extras.keys().find(|name| name.is_empty() || name.chars().any(char::is_whitespace))
		{
			return Err(EndpointError::InvalidExtraName { name: name.clone() });
		}

		Ok(Endpoint { request: self.request, authorize, access, extras: self.extras })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("URL fixture should parse.")
	}

	#[test]
	fn builder_requires_authorize_and_access() {
		let err = Endpoint::builder()
			.access(url("https://example.com/token"))
			.build()
			.expect_err("Authorize URL must be required.");

		assert_eq!(err, EndpointError::MissingAuthorize);

		let err = Endpoint::builder()
			.authorize(url("https://example.com/auth"))
			.build()
			.expect_err("Access URL must be required.");

		assert_eq!(err, EndpointError::MissingAccess);
	}

	#[test]
	fn extras_are_validated_and_retrievable() {
		let err = Endpoint::builder()
			.authorize(url("https://example.com/auth"))
			.access(url("https://example.com/token"))
			.extra("bad name", url("https://example.com/revoke"))
			.build()
			.expect_err("Whitespace in extra names must be rejected.");

		assert!(matches!(err, EndpointError::InvalidExtraName { .. }));

		let endpoint = Endpoint::builder()
			.authorize(url("https://example.com/auth"))
			.access(url("https://example.com/token"))
			.extra("revoke", url("https://example.com/revoke"))
			.build()
			.expect("Endpoint with extras should build.");

		assert_eq!(
			endpoint.extra("revoke").map(Url::as_str),
			Some("https://example.com/revoke")
		);
		assert!(endpoint.request.is_none());
	}
}
