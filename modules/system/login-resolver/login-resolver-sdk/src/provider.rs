//! Plugin API trait for login backends.

use async_trait::async_trait;

use crate::error::AuthenticationError;
use crate::models::LoginResult;

/// One login attempt against one backend.
///
/// A provider is built with everything it needs (configuration,
/// collaborators, the caller's credentials) and then consumed by
/// [`login`](Self::login). Build a fresh instance for every attempt.
///
/// Every provider must return a `user_id` that is stable across logins for
/// the same identity and unique within its [`provider_id`](Self::provider_id).
#[async_trait]
pub trait LoginProvider: Send {
    /// Namespace of the `user_id`s this provider returns.
    fn provider_id(&self) -> &str;

    /// Authenticate and normalize the identity.
    ///
    /// # Errors
    ///
    /// [`AuthenticationError`] wrapping the root cause. Callers must not
    /// reveal the cause to the end user.
    async fn login(self: Box<Self>) -> Result<LoginResult, AuthenticationError>;
}
