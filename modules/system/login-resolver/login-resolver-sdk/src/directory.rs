//! Directory (LDAP / Active Directory) client contract.
//!
//! The wire protocol lives elsewhere. Providers open one connection per
//! login, bind, search and unbind; pooling is the connector's business.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::DirectoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Only the entry named by the base DN.
    Base,
    /// Direct children of the base DN.
    OneLevel,
    /// The base DN and everything below it.
    Subtree,
}

/// One search result. Attribute names are matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    dn: String,
    attributes: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_values<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn dn(&self) -> &str {
        &self.dn
    }

    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.attributes
            .get(&name.to_ascii_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }
}

/// Opens directory sessions.
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// # Errors
    ///
    /// [`DirectoryError::Unavailable`] when the server cannot be reached.
    async fn connect(&self) -> Result<Box<dyn DirectoryConnection>, DirectoryError>;
}

/// A single directory session.
#[async_trait]
pub trait DirectoryConnection: Send {
    /// # Errors
    ///
    /// [`DirectoryError::BindRejected`] when the server refuses the
    /// credentials; other variants for transport failures.
    async fn bind(&mut self, dn: &str, password: &SecretString) -> Result<(), DirectoryError>;

    /// # Errors
    ///
    /// [`DirectoryError`] on transport or protocol failure. A search that
    /// matches nothing is `Ok(vec![])`.
    async fn search(
        &mut self,
        base_dn: &str,
        filter: &str,
        scope: SearchScope,
        attributes: &[&str],
    ) -> Result<Vec<DirectoryEntry>, DirectoryError>;

    /// # Errors
    ///
    /// [`DirectoryError`] if the session could not be closed cleanly.
    async fn unbind(&mut self) -> Result<(), DirectoryError>;
}
