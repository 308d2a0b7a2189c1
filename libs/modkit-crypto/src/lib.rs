#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Cryptographic building blocks for ModKit authentication.
//!
//! - [`password`]: PBKDF2 password hashes in a self-describing format
//! - [`token`]: expiring, authenticated bearer tokens
//! - [`signature`]: streaming verification of signed requests

pub mod password;
pub mod signature;
pub mod token;

pub use password::{HashAlgorithm, HashedCredential, PasswordHasher};
pub use signature::{AuthorizationHeader, SignatureError, SignatureVerifier};
pub use token::{TokenCodec, TokenError, TokenSealer, TokenService};
