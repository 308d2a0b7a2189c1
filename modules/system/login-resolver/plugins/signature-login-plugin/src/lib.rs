#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Signature Login Plugin
//!
//! Authenticates requests carrying
//! `Authorization: <scheme> <identifier>:<base64 Ed25519ph signature>`
//! over the canonical prefix (method, path, required headers) and the
//! body. The key is either registered for the identifier or disclosed by
//! the request body itself.
//!
//! ## Configuration
//!
//! ```yaml
//! signature:
//!   provider_id: signature
//!   scheme: Signed
//!   required_headers: [date, host]
//!   key_source: registered   # or self_disclosed
//!   max_buffered_body: 1048576
//! ```

pub mod config;
pub mod domain;

pub use config::{KeySource, SignatureLoginConfig};
pub use domain::filter::{SignedRequestError, SignedRequestFilter};
pub use domain::provider::SignatureProvider;
pub use domain::service::SignatureLoginPlugin;
