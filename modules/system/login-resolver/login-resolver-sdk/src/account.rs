//! Application accounts and the store that persists them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DataAccessError;
use crate::models::LoginKey;

/// Stable application identity, independent of the provider used to log in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub title: String,
    pub active: bool,
}

/// Persisted row. Soft-deleted rows are kept for audit but never surfaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: Account,
    pub deleted: bool,
}

impl AccountRecord {
    /// The account, unless the row is soft-deleted.
    #[must_use]
    pub fn visible(self) -> Option<Account> {
        (!self.deleted).then_some(self.account)
    }
}

/// Account persistence, owned outside this module.
///
/// Calls are synchronous: bearer tokens resolve their account lazily from
/// inside token unpacking, which is not async. Implementations must be safe
/// for concurrent reads and serialize their own writes.
pub trait AccountStore: Send + Sync {
    /// # Errors
    ///
    /// [`DataAccessError`] when the backing store fails.
    fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, DataAccessError>;

    /// Account linked to a `(provider_id, user_id)` pair.
    ///
    /// # Errors
    ///
    /// [`DataAccessError`] when the backing store fails.
    fn find_by_login(&self, key: &LoginKey) -> Result<Option<AccountRecord>, DataAccessError>;

    /// # Errors
    ///
    /// [`DataAccessError`] when the row cannot be written.
    fn insert(&self, record: AccountRecord) -> Result<(), DataAccessError>;

    /// Link a login pair to an existing account.
    ///
    /// # Errors
    ///
    /// [`DataAccessError`] when the link cannot be written.
    fn link_login(&self, key: LoginKey, account_id: Uuid) -> Result<(), DataAccessError>;

    /// Mark an account active or inactive.
    ///
    /// # Errors
    ///
    /// [`DataAccessError`] when the row cannot be written.
    fn set_active(&self, account_id: Uuid, active: bool) -> Result<(), DataAccessError>;
}
