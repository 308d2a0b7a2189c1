//! Signed-request verification.
//!
//! The signed bytes are the canonical prefix from [`canonical_prefix`]
//! followed by the raw body. Signatures are Ed25519ph over SHA-512 of
//! those bytes, which lets a known key verify the body as it streams.

mod canonical;
mod error;
mod header;
mod partial;
mod verifier;

pub use canonical::canonical_prefix;
pub use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
pub use error::SignatureError;
pub use header::AuthorizationHeader;
pub use partial::{PartialVerification, PendingCheck};
pub use verifier::{
    DEFAULT_MAX_BUFFERED_BODY, SignatureVerifier, sign_request, verifying_key_from_bytes,
};
