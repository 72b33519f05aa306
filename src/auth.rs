//! Auth-domain descriptors: provider endpoints, client applications, per-variant parameters,
//! and the credential sets they produce.

pub mod application;
pub mod credentials;
pub mod endpoint;
pub mod params;
pub mod scope;
pub mod secret;

pub use application::*;
pub use credentials::*;
pub use endpoint::*;
pub use params::*;
pub use scope::*;
pub use secret::*;
