//! Adapters that hand signed credentials to concrete HTTP clients.
//!
//! The core never executes requests; these extensions translate a [`SignedRequest`] into the
//! request type of a client. `reqwest` support lives behind the `reqwest` feature.
//!
//! [`SignedRequest`]: crate::token::SignedRequest

pub mod request_signer;

pub use request_signer::*;
