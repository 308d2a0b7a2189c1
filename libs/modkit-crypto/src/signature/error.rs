use thiserror::Error;

/// Signed-request verification failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("malformed authorization header: {0}")]
    MalformedHeader(String),

    #[error("unsupported authorization scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("required header '{0}' is missing")]
    MissingHeader(String),

    #[error("malformed public key: {0}")]
    MalformedKey(String),

    /// The check ran before the self-disclosed key was supplied.
    #[error("public key was never provided")]
    MissingKey,

    #[error("request body exceeds {limit} buffered bytes")]
    BodyTooLarge { limit: usize },

    #[error("signature verification failed")]
    Invalid,
}
