//! Request signing contracts for arbitrary HTTP clients.

// self
#[cfg(feature = "reqwest")] use crate::error::ConfigError;
use crate::{
	_prelude::*,
	token::{Protocol, SignedRequest, Token},
};

/// Signs an outbound request of any client type.
///
/// Generic over both the request and error types so implementers can integrate with any client
/// builder while the core stays free of those dependencies.
pub trait RequestSignerExt<Request, Error>
where
	Self: Send + Sync,
{
	/// Consumes the request and returns it with credentials attached.
	fn sign_request(&self, request: Request) -> Result<Request, Error>;
}

/// Applies a [`SignedRequest`] to a client request type.
pub trait ApplySigned: Sized {
	/// Error raised when the signed output cannot be represented.
	type Error;

	/// Replaces the URL and inserts the header additions.
	fn apply_signed(self, signed: SignedRequest) -> Result<Self, Self::Error>;

	/// HTTP method used for signing.
	fn signing_method(&self) -> &str;

	/// URL used for signing.
	fn signing_url(&self) -> &Url;
}

impl<P, R> RequestSignerExt<R, Error> for Token<P>
where
	P: Protocol,
	R: ApplySigned,
	Error: From<R::Error>,
{
	fn sign_request(&self, request: R) -> Result<R> {
		let signed = self.sign(request.signing_method(), request.signing_url())?;

		Ok(request.apply_signed(signed)?)
	}
}

#[cfg(feature = "reqwest")]
impl ApplySigned for reqwest::Request {
	type Error = Error;

	fn apply_signed(mut self, signed: SignedRequest) -> Result<Self> {
		// crates.io
		use reqwest::header::{HeaderName, HeaderValue};

		*self.url_mut() = signed.url;

		for (name, value) in signed.config.headers() {
			let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
				ConfigError::InvalidHeader { name: name.to_owned(), message: e.to_string() }
			})?;
			let mut header_value = HeaderValue::from_str(value).map_err(|e| {
				ConfigError::InvalidHeader { name: name.to_owned(), message: e.to_string() }
			})?;

			header_value.set_sensitive(true);
			self.headers_mut().insert(header_name, header_value);
		}

		Ok(self)
	}

	fn signing_method(&self) -> &str {
		self.method().as_str()
	}

	fn signing_url(&self) -> &Url {
		self.url()
	}
}
