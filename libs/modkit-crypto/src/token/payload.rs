//! Typed token services over the byte-level [`TokenCodec`].

use std::marker::PhantomData;

use time::OffsetDateTime;
use uuid::Uuid;

use super::{TokenCodec, TokenError, UnpackedToken};

/// Converts a payload to and from token bytes.
pub trait PayloadCodec<P>: Send + Sync {
    fn marshal(&self, payload: &P) -> Vec<u8>;

    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`] when `bytes` do not encode a `P`.
    fn unmarshal(&self, bytes: &[u8]) -> Result<P, TokenError>;
}

/// Issues and opens tokens carrying a `P`.
pub trait TokenService<P>: Send + Sync {
    fn create_token(&self, payload: &P, expires_at: OffsetDateTime) -> String;

    /// # Errors
    ///
    /// Returns [`TokenError`] when the token is forged, malformed or expired
    /// at `now`.
    fn unpack_token_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<UnpackedToken<P>, TokenError>;

    /// # Errors
    ///
    /// Same as [`Self::unpack_token_at`] evaluated at the current time.
    fn unpack_token(&self, token: &str) -> Result<UnpackedToken<P>, TokenError> {
        self.unpack_token_at(token, OffsetDateTime::now_utc())
    }
}

/// [`TokenService`] built from a codec engine and a payload codec.
pub struct CodecTokenService<P, C> {
    codec: TokenCodec,
    payload_codec: C,
    _payload: PhantomData<fn() -> P>,
}

impl<P, C: PayloadCodec<P>> CodecTokenService<P, C> {
    #[must_use]
    pub fn new(codec: TokenCodec, payload_codec: C) -> Self {
        Self {
            codec,
            payload_codec,
            _payload: PhantomData,
        }
    }
}

impl<P, C: PayloadCodec<P>> TokenService<P> for CodecTokenService<P, C> {
    fn create_token(&self, payload: &P, expires_at: OffsetDateTime) -> String {
        self.codec
            .create_token(&self.payload_codec.marshal(payload), expires_at)
    }

    fn unpack_token_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<UnpackedToken<P>, TokenError> {
        let raw = self.codec.unpack_token_at(token, now)?;
        let payload = self.payload_codec.unmarshal(raw.payload())?;
        Ok(raw.map(|_| payload))
    }
}

/// Payload codec assembled from a pair of functions.
pub struct FnPayloadCodec<P> {
    marshal: Box<dyn Fn(&P) -> Vec<u8> + Send + Sync>,
    unmarshal: Box<dyn Fn(&[u8]) -> Result<P, TokenError> + Send + Sync>,
}

impl<P> FnPayloadCodec<P> {
    pub fn new(
        marshal: impl Fn(&P) -> Vec<u8> + Send + Sync + 'static,
        unmarshal: impl Fn(&[u8]) -> Result<P, TokenError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            marshal: Box::new(marshal),
            unmarshal: Box::new(unmarshal),
        }
    }
}

impl<P> PayloadCodec<P> for FnPayloadCodec<P> {
    fn marshal(&self, payload: &P) -> Vec<u8> {
        (self.marshal)(payload)
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<P, TokenError> {
        (self.unmarshal)(bytes)
    }
}

/// 16 raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl PayloadCodec<Uuid> for UuidCodec {
    fn marshal(&self, payload: &Uuid) -> Vec<u8> {
        payload.as_bytes().to_vec()
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<Uuid, TokenError> {
        Uuid::from_slice(bytes).map_err(|e| TokenError::Invalid(format!("uuid payload: {e}")))
    }
}

/// 8 bytes, big-endian.
#[derive(Debug, Clone, Copy, Default)]
pub struct I64Codec;

impl PayloadCodec<i64> for I64Codec {
    fn marshal(&self, payload: &i64) -> Vec<u8> {
        payload.to_be_bytes().to_vec()
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<i64, TokenError> {
        let array: [u8; 8] = bytes
            .try_into()
            .map_err(|_| TokenError::Invalid(format!("i64 payload of {} bytes", bytes.len())))?;
        Ok(i64::from_be_bytes(array))
    }
}

/// UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl PayloadCodec<String> for StringCodec {
    fn marshal(&self, payload: &String) -> Vec<u8> {
        payload.as_bytes().to_vec()
    }

    fn unmarshal(&self, bytes: &[u8]) -> Result<String, TokenError> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| TokenError::Invalid(format!("string payload: {e}")))
    }
}

pub type UuidTokenService = CodecTokenService<Uuid, UuidCodec>;
pub type I64TokenService = CodecTokenService<i64, I64Codec>;
pub type StringTokenService = CodecTokenService<String, StringCodec>;

impl UuidTokenService {
    #[must_use]
    pub fn uuid(codec: TokenCodec) -> Self {
        Self::new(codec, UuidCodec)
    }
}

impl I64TokenService {
    #[must_use]
    pub fn int(codec: TokenCodec) -> Self {
        Self::new(codec, I64Codec)
    }
}

impl StringTokenService {
    #[must_use]
    pub fn string(codec: TokenCodec) -> Self {
        Self::new(codec, StringCodec)
    }
}
