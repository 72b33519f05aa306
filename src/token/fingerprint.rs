//! Stable cache keys derived from a token's endpoint and parameters.

// std
use std::io::{self, Write};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, auth::Endpoint, store::StoreError, token::Protocol};

/// Deterministic cache key: URL-safe base64 (no padding) of a SHA-256 digest over the canonical
/// JSON of `{variant, endpoint, params}`.
///
/// The application is not part of the digest, so two applications sharing an endpoint and
/// parameter set share a cache entry.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);
impl Fingerprint {
	/// Computes the fingerprint for a variant's endpoint + parameter pair.
	pub fn compute<P>(endpoint: &Endpoint, params: &P::Params) -> Result<Self, StoreError>
	where
		P: Protocol,
	{
		#[derive(Serialize)]
		struct Identity<'a, T> {
			variant: &'static str,
			endpoint: &'a Endpoint,
			params: &'a T,
		}

		let mut writer = DigestWriter(Sha256::new());

		serde_json::to_writer(&mut writer, &Identity { variant: P::NAME, endpoint, params })
			.map_err(|e| StoreError::Serialization {
				message: format!("Failed to encode token identity: {e}"),
			})?;

		Ok(Self(URL_SAFE_NO_PAD.encode(writer.0.finalize())))
	}

	/// Returns the encoded fingerprint.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for Fingerprint {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

struct DigestWriter(Sha256);
impl Write for DigestWriter {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.update(buf);

		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}
