//! Client application identity registered with a provider.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Immutable client identity: consumer key, optional secret, and redirect configuration.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Application {
	/// Human-readable application name.
	pub name: String,
	/// Consumer key (OAuth 1.0) or client id (OAuth 2.0).
	pub key: String,
	/// Consumer/client secret; public clients omit it.
	pub secret: Option<TokenSecret>,
	/// Redirect URI registered with the provider, when the flow needs one.
	pub redirect_uri: Option<Url>,
}
impl Application {
	/// Creates a public application without a secret or redirect URI.
	pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
		Self { name: name.into(), key: key.into(), secret: None, redirect_uri: None }
	}

	/// Attaches a consumer/client secret.
	pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
		self.secret = Some(TokenSecret::new(secret));

		self
	}

	/// Attaches a redirect URI.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Returns the secret value, or an empty string for public clients.
	pub fn secret_str(&self) -> &str {
		self.secret.as_ref().map(TokenSecret::expose).unwrap_or_default()
	}
}
impl Debug for Application {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Application")
			.field("name", &self.name)
			.field("key", &self.key)
			.field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
			.field("redirect_uri", &self.redirect_uri)
			.finish()
	}
}
impl Display for Application {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{} ({})", self.name, self.key)
	}
}
