use thiserror::Error;

/// Token lifecycle failures.
///
/// Callers must surface every variant as the same generic message
/// ([`TokenError::PUBLIC_MESSAGE`]); the detail is for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The embedded expiry is not in the future.
    #[error("token expired")]
    Expired,

    /// Authentication tag mismatch, bad encoding, truncated or unknown framing.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// The token is authentic but its key no longer resolves to a payload.
    #[error("token payload could not be resolved: {0}")]
    Unresolved(String),

    /// The source the payload resolves against failed. Not the token's fault.
    #[error("token payload source unavailable: {0}")]
    SourceUnavailable(String),

    /// The signing key is too short to be used.
    #[error("token key too short: {len} bytes, need at least {min}")]
    WeakKey { len: usize, min: usize },
}

impl TokenError {
    pub const PUBLIC_MESSAGE: &'static str = "invalid token";

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }
}
