//! Domain errors for the login resolver.

use login_resolver_sdk::{AccountError, AuthenticationError, FailureCause, LoginResolverError};
use modkit_crypto::TokenError;
use modkit_security::ContextError;

/// Internal domain errors. Carry the full detail for logs; the public
/// conversion drops it.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error(transparent)]
    Authentication(#[from] AuthenticationError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for LoginResolverError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Authentication(e) => match e.cause {
                FailureCause::Directory(_) | FailureCause::DataAccess(_) => {
                    Self::ServiceUnavailable(format!("{} backend unavailable", e.provider))
                }
                FailureCause::Signature(_) => Self::InvalidSignature,
                FailureCause::NoProvider => {
                    Self::Internal("no login provider configured".to_owned())
                }
                FailureCause::BadCredentials
                | FailureCause::AccountNotFound
                | FailureCause::AccountDisabled => Self::Unauthenticated,
            },
            DomainError::Account(e) => match e {
                AccountError::NotLinked(_) | AccountError::NotFound(_) => Self::AccountNotFound,
                AccountError::Inactive(_) => Self::Unauthenticated,
                AccountError::Store(_) => Self::ServiceUnavailable("account store".to_owned()),
            },
            DomainError::Token(e) => match e {
                TokenError::Expired | TokenError::Invalid(_) | TokenError::Unresolved(_) => {
                    Self::InvalidToken
                }
                TokenError::SourceUnavailable(_) => {
                    Self::ServiceUnavailable("account store".to_owned())
                }
                TokenError::WeakKey { .. } => Self::Internal("token key rejected".to_owned()),
            },
            DomainError::Context(e) => Self::Internal(e.to_string()),
            DomainError::InvalidConfig(msg) | DomainError::Internal(msg) => Self::Internal(msg),
        }
    }
}
