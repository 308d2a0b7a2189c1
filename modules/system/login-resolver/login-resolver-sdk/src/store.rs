//! Credential and public key stores used by the database and signature
//! providers.

use async_trait::async_trait;
use modkit_crypto::signature::VerifyingKey;

use crate::error::DataAccessError;

/// A user row as the database provider sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub username: String,
    /// Stored password hash in `$<tag>$<rounds>$<salt>$<output>` form.
    pub password_hash: String,
    pub enabled: bool,
    pub display_name: Option<String>,
    pub given_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// # Errors
    ///
    /// [`DataAccessError`] when the query fails. An unknown username is
    /// `Ok(None)`.
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DataAccessError>;

    /// Replace a user's password hash, e.g. after a rehash on login.
    ///
    /// # Errors
    ///
    /// [`DataAccessError`] when the update fails.
    async fn update_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), DataAccessError>;
}

/// Public keys registered for signing identities.
#[async_trait]
pub trait PublicKeyStore: Send + Sync {
    /// # Errors
    ///
    /// [`DataAccessError`] when the lookup fails. An unknown identifier is
    /// `Ok(None)`.
    async fn public_key(&self, identifier: &str) -> Result<Option<VerifyingKey>, DataAccessError>;
}
