//! Plugin entry point: builds one [`DatabaseProvider`] per login attempt.

use std::sync::Arc;

use login_resolver_sdk::{CredentialStore, Credentials, LoginProvider};
use modkit_crypto::PasswordHasher;
use thiserror::Error;

use super::provider::{DatabaseProvider, DbLoginShared};
use crate::config::DbLoginConfig;

#[derive(Debug, Error)]
pub enum DbConfigError {
    #[error("query_timeout must be greater than zero")]
    ZeroTimeout,
}

/// Database login plugin.
#[derive(Clone)]
pub struct DbLoginPlugin {
    shared: Arc<DbLoginShared>,
}

impl DbLoginPlugin {
    /// # Errors
    ///
    /// [`DbConfigError::ZeroTimeout`] for a zero query timeout.
    pub fn new(
        config: DbLoginConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, DbConfigError> {
        if config.query_timeout.is_zero() {
            return Err(DbConfigError::ZeroTimeout);
        }

        let hasher = PasswordHasher::new(config.hash_algorithm, config.hash_rounds);
        let dummy_hash = hasher.derive_hash("").into_string();
        tracing::info!(
            provider = %config.provider_id,
            algorithm = %config.hash_algorithm,
            rounds = hasher.rounds(),
            timeout = ?config.query_timeout,
            "database login plugin configured"
        );

        Ok(Self {
            shared: Arc::new(DbLoginShared {
                config,
                store,
                hasher,
                dummy_hash,
            }),
        })
    }

    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.shared.config.provider_id
    }

    /// Hasher for new credential rows, matching what logins verify against.
    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.shared.hasher
    }

    #[must_use]
    pub fn provider(&self, credentials: Credentials) -> Box<dyn LoginProvider> {
        Box::new(DatabaseProvider::new(Arc::clone(&self.shared), credentials))
    }
}
