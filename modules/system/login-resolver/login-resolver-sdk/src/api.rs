//! Public API trait for the login resolver.

use async_trait::async_trait;
use modkit_security::SecurityContext;

use crate::error::LoginResolverError;
use crate::models::LoginOutcome;
use crate::provider::LoginProvider;

/// Public API trait for the login resolver.
///
/// ```ignore
/// let resolver: Arc<dyn LoginResolverClient> = ...;
///
/// // Password login through any provider
/// let outcome = resolver.login(ldap.provider(credentials)).await?;
///
/// // Later requests present the issued token
/// let ctx = resolver.authenticate(token).await?;
/// ```
#[async_trait]
pub trait LoginResolverClient: Send + Sync {
    /// Run `provider`, map its identity to an account and issue a bearer
    /// token.
    ///
    /// # Errors
    ///
    /// - `Unauthenticated` if the provider rejected the login or the
    ///   account is inactive
    /// - `AccountNotFound` if no account is linked and provisioning is off
    /// - `ServiceUnavailable` if a backend could not be reached
    async fn login(
        &self,
        provider: Box<dyn LoginProvider>,
    ) -> Result<LoginOutcome, LoginResolverError>;

    /// Validate a bearer token and return the identity it names.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the token is forged, malformed, expired or names
    ///   an account that no longer exists
    /// - `ServiceUnavailable` if the account store failed
    async fn authenticate(&self, bearer_token: &str)
    -> Result<SecurityContext, LoginResolverError>;
}
