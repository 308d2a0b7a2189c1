//! In-memory [`AccountStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use login_resolver_sdk::{AccountRecord, AccountStore, DataAccessError, LoginKey};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct State {
    records: HashMap<Uuid, AccountRecord>,
    logins: HashMap<LoginKey, Uuid>,
}

/// Account store backed by a process-local map.
///
/// Suitable for tests, the probe app and single-node deployments that
/// seed accounts at startup.
#[derive(Default)]
pub struct InMemoryAccountStore {
    state: RwLock<State>,
    failing: AtomicBool,
}

impl InMemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail with [`DataAccessError::Unavailable`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Mark the row deleted while keeping it stored.
    pub fn soft_delete(&self, id: Uuid) {
        if let Some(record) = self.state.write().records.get_mut(&id) {
            record.deleted = true;
        }
    }

    /// Number of stored rows, deleted ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self) -> Result<(), DataAccessError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataAccessError::Unavailable("account store offline".to_owned()));
        }
        Ok(())
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<AccountRecord>, DataAccessError> {
        self.check()?;
        Ok(self.state.read().records.get(&id).cloned())
    }

    fn find_by_login(&self, key: &LoginKey) -> Result<Option<AccountRecord>, DataAccessError> {
        self.check()?;
        let state = self.state.read();
        Ok(state
            .logins
            .get(key)
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    fn insert(&self, record: AccountRecord) -> Result<(), DataAccessError> {
        self.check()?;
        let mut state = self.state.write();
        if state.records.contains_key(&record.account.id) {
            return Err(DataAccessError::Query(format!(
                "account {} already exists",
                record.account.id
            )));
        }
        state.records.insert(record.account.id, record);
        Ok(())
    }

    fn link_login(&self, key: LoginKey, account_id: Uuid) -> Result<(), DataAccessError> {
        self.check()?;
        let mut state = self.state.write();
        if !state.records.contains_key(&account_id) {
            return Err(DataAccessError::Query(format!(
                "cannot link {key}: account {account_id} does not exist"
            )));
        }
        state.logins.insert(key, account_id);
        Ok(())
    }

    fn set_active(&self, account_id: Uuid, active: bool) -> Result<(), DataAccessError> {
        self.check()?;
        let mut state = self.state.write();
        let record = state
            .records
            .get_mut(&account_id)
            .ok_or_else(|| DataAccessError::Query(format!("account {account_id} does not exist")))?;
        record.account.active = active;
        Ok(())
    }
}
