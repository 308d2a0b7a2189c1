//! Single-use database login.

use std::future::Future;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use login_resolver_sdk::{
    AttributeKey, AuthenticationError, CredentialRecord, CredentialStore, Credentials,
    DataAccessError, FailureCause, LoginProvider, LoginResult,
};
use modkit_crypto::PasswordHasher;
use secrecy::ExposeSecret;
use tracing::{debug, error, warn};

use crate::config::DbLoginConfig;

/// State shared by every provider a plugin hands out.
pub(crate) struct DbLoginShared {
    pub(crate) config: DbLoginConfig,
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) hasher: PasswordHasher,
    /// Verified against when the username is unknown, so both paths cost
    /// one key derivation.
    pub(crate) dummy_hash: String,
}

/// Looks the user up in the credential store and checks the password hash.
pub struct DatabaseProvider {
    shared: Arc<DbLoginShared>,
    credentials: Credentials,
}

/// Await a store call with the configured ceiling.
async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, DataAccessError>>,
) -> Result<T, DataAccessError> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| DataAccessError::Timeout(limit))?
}

/// Run a key derivation on the blocking pool. Stored hashes may claim up
/// to `MAX_ROUNDS` iterations.
async fn off_worker<T: Send + 'static>(job: impl FnOnce() -> T + Send + 'static) -> Option<T> {
    tokio::task::spawn_blocking(job)
        .await
        .inspect_err(|e| error!(error = %e, "password hashing task failed"))
        .ok()
}

impl DatabaseProvider {
    pub(crate) fn new(shared: Arc<DbLoginShared>, credentials: Credentials) -> Self {
        Self {
            shared,
            credentials,
        }
    }

    fn fail(&self, cause: impl Into<FailureCause>) -> AuthenticationError {
        AuthenticationError::new(
            &self.shared.config.provider_id,
            &self.credentials.username,
            cause,
        )
    }

    #[tracing::instrument(
        skip_all,
        fields(provider = %self.shared.config.provider_id, identity = %self.credentials.username)
    )]
    async fn run(&self) -> Result<LoginResult, AuthenticationError> {
        let shared = &self.shared;

        let record = bounded(
            shared.config.query_timeout,
            shared.store.find_by_username(&self.credentials.username),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "credential lookup failed");
            self.fail(e)
        })?;

        let Some(record) = record else {
            black_box(self.verify_password(shared.dummy_hash.clone()).await);
            warn!("unknown username");
            return Err(self.fail(FailureCause::AccountNotFound));
        };

        if !self.verify_password(record.password_hash.clone()).await {
            warn!(user_id = record.user_id, "password mismatch");
            return Err(self.fail(FailureCause::BadCredentials));
        }
        if !record.enabled {
            warn!(user_id = record.user_id, "account disabled");
            return Err(self.fail(FailureCause::AccountDisabled));
        }

        if shared.config.rehash_on_login && shared.hasher.needs_rehash(&record.password_hash) {
            self.rehash(&record).await;
        }

        Ok(self.build_result(record))
    }

    /// Fails closed if the hashing task does not complete.
    async fn verify_password(&self, stored: String) -> bool {
        let hasher = self.shared.hasher;
        let password = self.credentials.password.clone();
        off_worker(move || hasher.verify(password.expose_secret(), &stored))
            .await
            .unwrap_or(false)
    }

    /// Best effort; a failed update leaves the old hash in place.
    async fn rehash(&self, record: &CredentialRecord) {
        let hasher = self.shared.hasher;
        let password = self.credentials.password.clone();
        let Some(fresh) = off_worker(move || hasher.derive_hash(password.expose_secret())).await
        else {
            return;
        };
        match bounded(
            self.shared.config.query_timeout,
            self.shared
                .store
                .update_password_hash(record.user_id, fresh.as_str()),
        )
        .await
        {
            Ok(()) => debug!(user_id = record.user_id, "password hash upgraded"),
            Err(e) => warn!(user_id = record.user_id, error = %e, "password hash upgrade failed"),
        }
    }

    fn build_result(&self, record: CredentialRecord) -> LoginResult {
        let builder = LoginResult::builder(
            &self.shared.config.provider_id,
            record.user_id.to_string(),
        )
        .text_opt(AttributeKey::Principal, Some(record.username))
        .text_opt(AttributeKey::DisplayName, record.display_name)
        .text_opt(AttributeKey::GivenName, record.given_name)
        .text_opt(AttributeKey::Surname, record.surname)
        .text_opt(AttributeKey::Email, record.email);
        builder.numeric_id(record.user_id).build()
    }
}

#[async_trait]
impl LoginProvider for DatabaseProvider {
    fn provider_id(&self) -> &str {
        &self.shared.config.provider_id
    }

    async fn login(self: Box<Self>) -> Result<LoginResult, AuthenticationError> {
        self.run().await
    }
}
