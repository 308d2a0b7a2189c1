//! Token framing: `{version: i32, expires_at_millis: i64, payload}` big-endian.

use std::sync::Arc;

use time::OffsetDateTime;

use super::{TokenError, TokenSealer};

/// Framing version written into every new token.
pub const TOKEN_FORMAT_VERSION: i32 = 1;

const HEADER_LEN: usize = 4 + 8;

/// A token that passed authentication and expiry checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedToken<P> {
    payload: P,
    expires_at: OffsetDateTime,
}

impl<P> UnpackedToken<P> {
    pub(crate) fn new(payload: P, expires_at: OffsetDateTime) -> Self {
        Self {
            payload,
            expires_at,
        }
    }

    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> P {
        self.payload
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    pub(crate) fn map<Q>(self, f: impl FnOnce(P) -> Q) -> UnpackedToken<Q> {
        UnpackedToken {
            payload: f(self.payload),
            expires_at: self.expires_at,
        }
    }
}

/// Byte-level token engine shared by every typed token service.
#[derive(Clone)]
pub struct TokenCodec {
    sealer: Arc<dyn TokenSealer>,
}

impl TokenCodec {
    #[must_use]
    pub fn new(sealer: Arc<dyn TokenSealer>) -> Self {
        Self { sealer }
    }

    /// Frame `payload` with the current version and `expires_at`, then seal.
    #[must_use]
    pub fn create_token(&self, payload: &[u8], expires_at: OffsetDateTime) -> String {
        let mut buffer = Vec::with_capacity(HEADER_LEN + payload.len());
        buffer.extend_from_slice(&TOKEN_FORMAT_VERSION.to_be_bytes());
        buffer.extend_from_slice(&epoch_millis(expires_at).to_be_bytes());
        buffer.extend_from_slice(payload);
        self.sealer.seal(&buffer)
    }

    /// Open and check a token against the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::unpack_token_at`].
    pub fn unpack_token(&self, token: &str) -> Result<UnpackedToken<Vec<u8>>, TokenError> {
        self.unpack_token_at(token, OffsetDateTime::now_utc())
    }

    /// Open and check a token against `now`.
    ///
    /// Authenticity is checked before expiry, so a forged token is always
    /// reported as invalid rather than expired.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Invalid`] if the tag fails, the buffer is shorter than
    ///   the header, or the version is unknown
    /// - [`TokenError::Expired`] if `now` is not before the embedded expiry
    pub fn unpack_token_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<UnpackedToken<Vec<u8>>, TokenError> {
        let mut buffer = self.sealer.open(token)?;
        if buffer.len() < HEADER_LEN {
            return Err(TokenError::invalid("truncated header"));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&buffer[..4]);
        let version = i32::from_be_bytes(version);
        if version != TOKEN_FORMAT_VERSION {
            return Err(TokenError::invalid(format!("unsupported version {version}")));
        }

        let mut millis = [0u8; 8];
        millis.copy_from_slice(&buffer[4..HEADER_LEN]);
        let expires_at = from_epoch_millis(i64::from_be_bytes(millis))?;

        if now >= expires_at {
            return Err(TokenError::Expired);
        }

        let payload = buffer.split_off(HEADER_LEN);
        Ok(UnpackedToken::new(payload, expires_at))
    }
}

fn epoch_millis(at: OffsetDateTime) -> i64 {
    at.unix_timestamp() * 1_000 + i64::from(at.millisecond())
}

fn from_epoch_millis(millis: i64) -> Result<OffsetDateTime, TokenError> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map_err(|e| TokenError::invalid(format!("expiry out of range: {e}")))
}
