//! Authentication of framed token buffers.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::TokenError;

type HmacSha256 = Hmac<Sha256>;

const TAG_LEN: usize = 32;

/// Turns a framed buffer into an opaque, string-safe token and back.
///
/// `open` must reject any token whose bytes were not produced by `seal`
/// under the same key.
pub trait TokenSealer: Send + Sync {
    fn seal(&self, buffer: &[u8]) -> String;

    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] when the token is not authentic.
    fn open(&self, token: &str) -> Result<Vec<u8>, TokenError>;
}

/// HMAC-SHA256 sealer: `base64url(buffer || tag)` without padding.
///
/// Authenticates but does not encrypt; payloads are readable by anyone
/// holding the token.
#[derive(Clone)]
pub struct HmacSealer {
    mac: HmacSha256,
}

impl HmacSealer {
    pub const MIN_KEY_LEN: usize = 32;

    /// # Errors
    ///
    /// Returns [`TokenError::WeakKey`] when `key` is shorter than
    /// [`Self::MIN_KEY_LEN`].
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        if key.len() < Self::MIN_KEY_LEN {
            return Err(TokenError::WeakKey {
                len: key.len(),
                min: Self::MIN_KEY_LEN,
            });
        }
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| TokenError::invalid(format!("hmac key rejected: {e}")))?;
        Ok(Self { mac })
    }

    /// Sealer over a fresh random key. Tokens do not survive a restart.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::new`] failures.
    pub fn random() -> Result<Self, TokenError> {
        let mut key = Zeroizing::new([0u8; Self::MIN_KEY_LEN]);
        rand::rng().fill_bytes(key.as_mut_slice());
        Self::new(key.as_slice())
    }
}

impl fmt::Debug for HmacSealer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSealer").finish_non_exhaustive()
    }
}

impl TokenSealer for HmacSealer {
    fn seal(&self, buffer: &[u8]) -> String {
        let mut mac = self.mac.clone();
        mac.update(buffer);
        let tag = mac.finalize().into_bytes();

        let mut sealed = Vec::with_capacity(buffer.len() + TAG_LEN);
        sealed.extend_from_slice(buffer);
        sealed.extend_from_slice(&tag);
        URL_SAFE_NO_PAD.encode(sealed)
    }

    fn open(&self, token: &str) -> Result<Vec<u8>, TokenError> {
        let mut sealed = URL_SAFE_NO_PAD
            .decode(token.as_bytes())
            .map_err(|e| TokenError::invalid(format!("encoding: {e}")))?;
        if sealed.len() < TAG_LEN {
            return Err(TokenError::invalid("shorter than authentication tag"));
        }

        let tag = sealed.split_off(sealed.len() - TAG_LEN);
        let mut mac = self.mac.clone();
        mac.update(&sealed);
        mac.verify_slice(&tag)
            .map_err(|_| TokenError::invalid("authentication tag mismatch"))?;
        Ok(sealed)
    }
}
