//! Mapping from provider identities to application accounts.

use std::sync::Arc;

use login_resolver_sdk::{Account, AccountError, AccountRecord, AccountStore, LoginResult};
use tracing::{debug, info};
use uuid::Uuid;

/// Resolves login results to accounts.
///
/// Lookups never create anything. [`Self::create_account`] and
/// [`Self::provision`] are the explicit, privileged paths.
#[derive(Clone)]
pub struct AccountResolver {
    store: Arc<dyn AccountStore>,
}

impl AccountResolver {
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Account linked to the result's `(provider_id, user_id)` pair.
    ///
    /// # Errors
    ///
    /// - [`AccountError::NotLinked`] if nothing is linked to the pair
    /// - [`AccountError::NotFound`] if the linked account is soft-deleted
    /// - [`AccountError::Store`] if the store fails
    pub fn lookup(&self, result: &LoginResult) -> Result<Account, AccountError> {
        let key = result.key();
        let Some(record) = self.store.find_by_login(&key)? else {
            debug!(login = %key, "no account linked");
            return Err(AccountError::NotLinked(key));
        };
        let id = record.account.id;
        record.visible().ok_or(AccountError::NotFound(id))
    }

    /// # Errors
    ///
    /// - [`AccountError::NotFound`] if the id is unknown or soft-deleted
    /// - [`AccountError::Store`] if the store fails
    pub fn get_account(&self, id: Uuid) -> Result<Account, AccountError> {
        self.store
            .find_by_id(id)?
            .and_then(AccountRecord::visible)
            .ok_or(AccountError::NotFound(id))
    }

    /// Persist a new, inactive account under a fresh id.
    ///
    /// # Errors
    ///
    /// [`AccountError::Store`] if the row cannot be written.
    pub fn create_account(&self, title: &str) -> Result<Account, AccountError> {
        let account = Account {
            id: Uuid::new_v4(),
            title: title.to_owned(),
            active: false,
        };
        self.store.insert(AccountRecord {
            account: account.clone(),
            deleted: false,
        })?;
        info!(account_id = %account.id, "account created");
        Ok(account)
    }

    /// Create an account for a first-time login, link the pair and
    /// activate it.
    ///
    /// # Errors
    ///
    /// [`AccountError::Store`] if any write fails. A failure after the
    /// insert leaves an inactive, unlinked account behind.
    pub fn provision(&self, result: &LoginResult) -> Result<Account, AccountError> {
        let mut account = self.create_account(result.display_title())?;
        let key = result.key();
        self.store.link_login(key.clone(), account.id)?;
        self.store.set_active(account.id, true)?;
        account.active = true;
        info!(account_id = %account.id, login = %key, "account provisioned");
        Ok(account)
    }
}
