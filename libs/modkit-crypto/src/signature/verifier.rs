use std::fmt;

use ed25519_dalek::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha512};

use super::SignatureError;

/// Default cap on bytes buffered while the key is not yet known.
pub const DEFAULT_MAX_BUFFERED_BODY: usize = 1024 * 1024;

/// Decode a 32-byte Ed25519 public key.
///
/// # Errors
///
/// Returns [`SignatureError::MalformedKey`] on wrong length or a point
/// that is not on the curve.
pub fn verifying_key_from_bytes(bytes: &[u8]) -> Result<VerifyingKey, SignatureError> {
    let array: &[u8; 32] = bytes.try_into().map_err(|_| {
        SignatureError::MalformedKey(format!("expected 32 bytes, got {}", bytes.len()))
    })?;
    VerifyingKey::from_bytes(array).map_err(|e| SignatureError::MalformedKey(e.to_string()))
}

/// Client-side counterpart of [`SignatureVerifier`]: Ed25519ph over
/// SHA-512(`prefix || body`).
///
/// # Errors
///
/// Returns [`SignatureError::Invalid`] if the key refuses to sign.
pub fn sign_request(
    key: &SigningKey,
    prefix: &[u8],
    body: &[u8],
) -> Result<Signature, SignatureError> {
    let mut digest = Sha512::new();
    digest.update(prefix);
    digest.update(body);
    key.sign_prehashed(digest, None)
        .map_err(|_| SignatureError::Invalid)
}

enum Phase {
    /// Self-disclosed key: bytes are held until the key arrives.
    AwaitingKey { buffer: Vec<u8>, limit: usize },
    /// Key known: bytes are hashed as they stream.
    ProcessingBody { key: VerifyingKey, digest: Sha512 },
}

/// Streaming Ed25519ph verifier over `prefix || body`.
///
/// The check consumes the verifier, so it can only run once and only
/// after the caller has fed every body byte.
pub struct SignatureVerifier {
    signature: Signature,
    phase: Phase,
}

impl SignatureVerifier {
    /// Key known up front; `prefix` is hashed immediately.
    #[must_use]
    pub fn with_known_key(key: VerifyingKey, signature: Signature, prefix: &[u8]) -> Self {
        let mut digest = Sha512::new();
        digest.update(prefix);
        Self {
            signature,
            phase: Phase::ProcessingBody { key, digest },
        }
    }

    /// Key disclosed later by the payload. `prefix` counts towards `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::BodyTooLarge`] if the prefix alone exceeds
    /// `limit`.
    pub fn self_signed(
        signature: Signature,
        prefix: &[u8],
        limit: usize,
    ) -> Result<Self, SignatureError> {
        let mut verifier = Self {
            signature,
            phase: Phase::AwaitingKey {
                buffer: Vec::new(),
                limit,
            },
        };
        verifier.update(prefix)?;
        Ok(verifier)
    }

    #[must_use]
    pub fn is_awaiting_key(&self) -> bool {
        matches!(self.phase, Phase::AwaitingKey { .. })
    }

    /// Feed the next chunk of signed bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::BodyTooLarge`] when buffering would exceed
    /// the configured limit.
    pub fn update(&mut self, chunk: &[u8]) -> Result<(), SignatureError> {
        match &mut self.phase {
            Phase::AwaitingKey { buffer, limit } => {
                if buffer.len().saturating_add(chunk.len()) > *limit {
                    return Err(SignatureError::BodyTooLarge { limit: *limit });
                }
                buffer.extend_from_slice(chunk);
            }
            Phase::ProcessingBody { digest, .. } => digest.update(chunk),
        }
        Ok(())
    }

    /// Supply the key for a self-signed request; buffered bytes are hashed
    /// and later chunks stream. Ignored once a key is already present.
    pub fn provide_key(&mut self, key: VerifyingKey) {
        if let Phase::AwaitingKey { buffer, .. } = &mut self.phase {
            let mut digest = Sha512::new();
            digest.update(buffer.as_slice());
            self.phase = Phase::ProcessingBody { key, digest };
        }
    }

    /// Verify the signature over everything fed so far.
    ///
    /// # Errors
    ///
    /// - [`SignatureError::MissingKey`] if a self-signed request never got
    ///   its key
    /// - [`SignatureError::Invalid`] if the signature does not match
    pub fn check_signature(self) -> Result<VerifyingKey, SignatureError> {
        match self.phase {
            Phase::AwaitingKey { .. } => Err(SignatureError::MissingKey),
            Phase::ProcessingBody { key, digest } => {
                key.verify_prehashed(digest, None, &self.signature)
                    .map_err(|_| SignatureError::Invalid)?;
                Ok(key)
            }
        }
    }
}

impl fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match &self.phase {
            Phase::AwaitingKey { buffer, .. } => format!("AwaitingKey({} bytes)", buffer.len()),
            Phase::ProcessingBody { .. } => "ProcessingBody".to_owned(),
        };
        f.debug_struct("SignatureVerifier")
            .field("phase", &phase)
            .finish_non_exhaustive()
    }
}
