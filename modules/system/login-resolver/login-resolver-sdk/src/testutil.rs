//! In-memory collaborators for tests and local probing.
//!
//! Enabled with the `testutil` feature.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use modkit_crypto::signature::VerifyingKey;
use parking_lot::RwLock;
use secrecy::{ExposeSecret, SecretString};

use crate::directory::{DirectoryConnection, DirectoryConnector, DirectoryEntry, SearchScope};
use crate::error::{DataAccessError, DirectoryError};
use crate::store::{CredentialRecord, CredentialStore, PublicKeyStore};

struct StoredEntry {
    entry: DirectoryEntry,
    password: Option<String>,
    disabled: bool,
}

#[derive(Default)]
struct DirectoryState {
    entries: RwLock<HashMap<String, StoredEntry>>,
    unreachable: AtomicBool,
    binds: AtomicUsize,
    searches: AtomicUsize,
    unbinds: AtomicUsize,
}

/// Directory server held in memory.
///
/// Binds succeed only for entries added with a password that are not
/// disabled. Searches understand `(objectClass=*)`, `(attr=*)` and
/// `(attr=value)` filters.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<DirectoryState>,
}

impl InMemoryDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry that cannot bind (a group, an OU).
    pub fn add_entry(&self, entry: DirectoryEntry) {
        self.insert(entry, None);
    }

    /// Add a bindable entry.
    pub fn add_user(&self, entry: DirectoryEntry, password: &str) {
        self.insert(entry, Some(password.to_owned()));
    }

    fn insert(&self, entry: DirectoryEntry, password: Option<String>) {
        self.state.entries.write().insert(
            entry.dn().to_ascii_lowercase(),
            StoredEntry {
                entry,
                password,
                disabled: false,
            },
        );
    }

    /// Make binds for `dn` fail the way a server rejects a disabled account.
    pub fn disable(&self, dn: &str) {
        if let Some(stored) = self.state.entries.write().get_mut(&dn.to_ascii_lowercase()) {
            stored.disabled = true;
        }
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.state.binds.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn search_count(&self) -> usize {
        self.state.searches.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn unbind_count(&self) -> usize {
        self.state.unbinds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DirectoryConnector for InMemoryDirectory {
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryError> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unavailable(
                "connection refused".to_owned(),
            ));
        }
        Ok(Box::new(InMemoryConnection {
            state: Arc::clone(&self.state),
            bound: false,
        }))
    }
}

struct InMemoryConnection {
    state: Arc<DirectoryState>,
    bound: bool,
}

enum Filter<'a> {
    Any,
    Present(&'a str),
    Equals(&'a str, &'a str),
}

impl<'a> Filter<'a> {
    fn parse(filter: &'a str) -> Result<Self, DirectoryError> {
        let unsupported = || DirectoryError::Operation {
            operation: "search",
            message: format!("unsupported filter {filter}"),
        };
        let inner = filter
            .strip_prefix('(')
            .and_then(|f| f.strip_suffix(')'))
            .ok_or_else(unsupported)?;
        let (name, value) = inner.split_once('=').ok_or_else(unsupported)?;
        Ok(match (name, value) {
            (n, "*") if n.eq_ignore_ascii_case("objectClass") => Self::Any,
            (n, "*") => Self::Present(n),
            (n, v) => Self::Equals(n, v),
        })
    }

    fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Self::Any => true,
            Self::Present(name) => !entry.values(name).is_empty(),
            Self::Equals(name, value) => entry
                .values(name)
                .iter()
                .any(|v| v.eq_ignore_ascii_case(value)),
        }
    }
}

fn in_scope(dn: &str, base: &str, scope: SearchScope) -> bool {
    match scope {
        SearchScope::Base => dn == base,
        SearchScope::OneLevel | SearchScope::Subtree => {
            if dn == base {
                return scope == SearchScope::Subtree;
            }
            let Some(rest) = dn.strip_suffix(base).and_then(|r| r.strip_suffix(',')) else {
                return false;
            };
            scope == SearchScope::Subtree || !rest.contains(',')
        }
    }
}

#[async_trait]
impl DirectoryConnection for InMemoryConnection {
    async fn bind(&mut self, dn: &str, password: &SecretString) -> Result<(), DirectoryError> {
        self.state.binds.fetch_add(1, Ordering::SeqCst);
        let entries = self.state.entries.read();
        let accepted = entries.get(&dn.to_ascii_lowercase()).is_some_and(|stored| {
            !stored.disabled && stored.password.as_deref() == Some(password.expose_secret())
        });
        if accepted {
            self.bound = true;
            Ok(())
        } else {
            Err(DirectoryError::BindRejected(
                "invalid credentials (49)".to_owned(),
            ))
        }
    }

    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        scope: SearchScope,
        _attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        self.state.searches.fetch_add(1, Ordering::SeqCst);
        if !self.bound {
            return Err(DirectoryError::Operation {
                operation: "search",
                message: "operations error: bind required (1)".to_owned(),
            });
        }
        let filter = Filter::parse(filter)?;
        let base = base_dn.to_ascii_lowercase();
        let entries = self.state.entries.read();
        Ok(entries
            .iter()
            .filter(|(dn, _)| in_scope(dn, &base, scope))
            .map(|(_, stored)| &stored.entry)
            .filter(|entry| filter.matches(entry))
            .cloned()
            .collect())
    }

    async fn unbind(&mut self) -> Result<(), DirectoryError> {
        self.state.unbinds.fetch_add(1, Ordering::SeqCst);
        self.bound = false;
        Ok(())
    }
}

/// Credential table held in memory, with knobs for slow and failing
/// queries.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    rows: RwLock<HashMap<String, CredentialRecord>>,
    delay: RwLock<Option<Duration>>,
    failing: AtomicBool,
    update_failing: AtomicBool,
    lookups: AtomicUsize,
}

impl InMemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: CredentialRecord) {
        self.rows.write().insert(record.username.clone(), record);
    }

    /// Delay every query by `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write() = delay;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail hash updates only; lookups keep working.
    pub fn set_update_failing(&self, failing: bool) {
        self.update_failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn get(&self, username: &str) -> Option<CredentialRecord> {
        self.rows.read().get(username).cloned()
    }

    async fn simulate_latency(&self) -> Result<(), DataAccessError> {
        let delay = *self.delay.read();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(DataAccessError::Unavailable("connection reset".to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, DataAccessError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await?;
        Ok(self.get(username))
    }

    async fn update_password_hash(
        &self,
        user_id: i64,
        password_hash: &str,
    ) -> Result<(), DataAccessError> {
        self.simulate_latency().await?;
        if self.update_failing.load(Ordering::SeqCst) {
            return Err(DataAccessError::Query("read-only replica".to_owned()));
        }
        let mut rows = self.rows.write();
        let row = rows
            .values_mut()
            .find(|r| r.user_id == user_id)
            .ok_or_else(|| DataAccessError::Query(format!("no user with id {user_id}")))?;
        password_hash.clone_into(&mut row.password_hash);
        Ok(())
    }
}

/// Public keys held in memory.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<String, VerifyingKey>>,
}

impl InMemoryKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identifier: &str, key: VerifyingKey) {
        self.keys.write().insert(identifier.to_owned(), key);
    }
}

#[async_trait]
impl PublicKeyStore for InMemoryKeyStore {
    async fn public_key(&self, identifier: &str) -> Result<Option<VerifyingKey>, DataAccessError> {
        Ok(self.keys.read().get(identifier).copied())
    }
}
