//! Crate-level error types shared by tokens, stores, and configuration.

// self
use crate::{_prelude::*, negotiate::NegotiationError, store::StoreError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Endpoint negotiation failed while acquiring credentials; the token stays uninitialized.
	#[error("Failed to acquire {protocol} credentials.")]
	Acquisition {
		/// Variant label (`oauth1`/`oauth2`).
		protocol: &'static str,
		/// Negotiation failure.
		#[source]
		source: NegotiationError,
	},
	/// Refreshing failed; callers may fall back to a forced re-initialization.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// The variant cannot perform the requested operation.
	#[error("{protocol} tokens do not support {operation}.")]
	UnsupportedOperation {
		/// Operation label.
		operation: &'static str,
		/// Variant label (`oauth1`/`oauth2`).
		protocol: &'static str,
	},
	/// The token has no credentials yet; call `init` first.
	#[error("Token must be initialized before calling {operation}.")]
	NotInitialized {
		/// Operation label.
		operation: &'static str,
	},
	/// Storage-layer failure.
	#[error("Credential store operation failed.")]
	Storage(
		#[from]
		#[source]
		StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}

/// Refresh failures. All of them are recoverable through a full re-acquisition.
#[derive(Debug, ThisError)]
pub enum RefreshError {
	/// The credential set carries no refresh token.
	#[error("Credentials do not include a refresh token.")]
	MissingRefreshToken,
	/// Provider rejected the refresh request.
	#[error("Provider rejected the refresh.")]
	Rejected {
		/// Negotiation failure.
		#[source]
		source: NegotiationError,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A URL handed to `sign` could not be rebuilt.
	#[error("URL `{url}` is invalid.")]
	InvalidUrl {
		/// Offending input.
		url: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The cache switch in the environment is not understood.
	#[error("Cache mode `{value}` is not recognized.")]
	InvalidCacheMode {
		/// Offending value.
		value: String,
	},
	/// A signed header cannot be represented by the HTTP client.
	#[error("Header `{name}` is invalid: {message}")]
	InvalidHeader {
		/// Header name.
		name: String,
		/// Client-side validation failure.
		message: String,
	},
	/// The interactive consent prompt failed.
	#[error("Failed to prompt for cache consent.")]
	Prompt(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_error_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert_eq!(error.to_string(), "Credential store operation failed.");
		assert!(
			!error.to_string().contains("disk full"),
			"The store message belongs to the source."
		);

		let source = StdError::source(&error)
			.expect("Error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn acquisition_error_keeps_negotiation_source() {
		let error = Error::Acquisition {
			protocol: "oauth2",
			source: NegotiationError::Rejected { reason: "access_denied".into() },
		};

		assert_eq!(error.to_string(), "Failed to acquire oauth2 credentials.");
		assert!(
			StdError::source(&error)
				.expect("Acquisition error should expose its source.")
				.to_string()
				.contains("access_denied")
		);
	}
}
