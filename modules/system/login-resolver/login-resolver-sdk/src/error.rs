//! Error types for the login resolver module.

use std::time::Duration;

use http::StatusCode;
use modkit_crypto::SignatureError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::LoginKey;

/// Directory client failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The server refused the bind. Bad password, unknown DN and disabled
    /// accounts all look the same from here.
    #[error("bind rejected: {0}")]
    BindRejected(String),

    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("directory {operation} failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

/// Relational store failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataAccessError {
    #[error("data store unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("query did not complete within {0:?}")]
    Timeout(Duration),
}

/// Why a provider rejected a login. Kept for logs; callers only ever see
/// [`AuthenticationError::PUBLIC_MESSAGE`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("bad credentials")]
    BadCredentials,

    #[error("account not found")]
    AccountNotFound,

    #[error("account disabled")]
    AccountDisabled,

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),

    #[error("no provider could handle the login")]
    NoProvider,
}

impl FailureCause {
    /// Infrastructure failures a caller may retry; credential failures are
    /// never retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Directory(DirectoryError::Unavailable(_))
                | Self::DataAccess(DataAccessError::Unavailable(_) | DataAccessError::Timeout(_))
        )
    }
}

/// A provider's login attempt failed.
///
/// Carries which provider and identity were involved so logs can tell
/// "wrong password" from "unknown user". The [`Display`](std::fmt::Display)
/// form includes that detail; use [`Self::PUBLIC_MESSAGE`] for responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication of `{identity}` via {provider} failed: {cause}")]
pub struct AuthenticationError {
    pub provider: String,
    pub identity: String,
    #[source]
    pub cause: FailureCause,
}

impl AuthenticationError {
    pub const PUBLIC_MESSAGE: &'static str = "invalid credentials";

    #[must_use]
    pub fn new(provider: &str, identity: &str, cause: impl Into<FailureCause>) -> Self {
        Self {
            provider: provider.to_owned(),
            identity: identity.to_owned(),
            cause: cause.into(),
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.cause.is_retryable()
    }
}

/// Account resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("no account linked to {0}")]
    NotLinked(LoginKey),

    /// Unknown or soft-deleted.
    #[error("account {0} not found")]
    NotFound(Uuid),

    #[error("account {0} is inactive")]
    Inactive(Uuid),

    #[error(transparent)]
    Store(#[from] DataAccessError),
}

/// Errors returned by the public login resolver API.
///
/// Messages are deliberately generic; the cause is logged, not returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginResolverError {
    /// Bad credentials, unknown user, disabled or inactive account.
    #[error("invalid credentials")]
    Unauthenticated,

    /// Expired, forged or malformed bearer token.
    #[error("invalid token")]
    InvalidToken,

    #[error("invalid signature")]
    InvalidSignature,

    /// No account is linked and provisioning is off.
    #[error("account not found")]
    AccountNotFound,

    /// A backend is down; the caller may retry.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Misconfiguration, such as a request pipeline stage that never ran.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LoginResolverError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::InvalidToken | Self::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }
            Self::AccountNotFound => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
