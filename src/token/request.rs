//! Signed request descriptions handed to the HTTP execution layer.

// self
use crate::_prelude::*;

/// Header additions produced by signing; empty when the credential travels in the URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestConfig {
	headers: Vec<(String, String)>,
}
impl RequestConfig {
	/// Adds (or replaces) a header; names compare case-insensitively.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let name = name.into();

		self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
		self.headers.push((name, value.into()));

		self
	}

	/// Returns the value of `name`, if present.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(existing, _)| existing.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Iterates over `(name, value)` pairs in insertion order.
	pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
		self.headers.iter().map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Returns `true` if signing added nothing.
	pub fn is_empty(&self) -> bool {
		self.headers.is_empty()
	}
}

/// Output of `sign`: the (possibly rewritten) URL plus the header additions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
	/// URL to request.
	pub url: Url,
	/// Header additions.
	pub config: RequestConfig,
}
impl SignedRequest {
	/// Creates a signed request description.
	pub fn new(url: Url, config: RequestConfig) -> Self {
		Self { url, config }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn headers_replace_case_insensitively() {
		let config = RequestConfig::default()
			.with_header("authorization", "Bearer old")
			.with_header("Authorization", "Bearer new");

		assert_eq!(config.header("AUTHORIZATION"), Some("Bearer new"));
		assert_eq!(config.headers().count(), 1);
		assert!(RequestConfig::default().is_empty());
	}
}
