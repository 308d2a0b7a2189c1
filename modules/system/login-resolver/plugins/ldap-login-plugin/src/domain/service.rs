//! Plugin entry point: builds one [`LdapProvider`] per login attempt.

use std::sync::Arc;

use login_resolver_sdk::{Credentials, DirectoryConnector, LoginProvider};
use thiserror::Error;

use super::provider::LdapProvider;
use crate::config::{LdapLoginConfig, USERNAME_PLACEHOLDER};

#[derive(Debug, Error)]
pub enum LdapConfigError {
    #[error("user_dn_template must contain {{username}}, got `{0}`")]
    MissingPlaceholder(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// LDAP login plugin.
///
/// Holds the validated configuration and the directory connector; every
/// call to [`Self::provider`] yields a fresh single-use provider.
#[derive(Clone)]
pub struct LdapLoginPlugin {
    config: Arc<LdapLoginConfig>,
    connector: Arc<dyn DirectoryConnector>,
}

impl LdapLoginPlugin {
    /// # Errors
    ///
    /// [`LdapConfigError`] when the configuration cannot produce a bind DN.
    pub fn new(
        config: LdapLoginConfig,
        connector: Arc<dyn DirectoryConnector>,
    ) -> Result<Self, LdapConfigError> {
        if config.provider_id.is_empty() {
            return Err(LdapConfigError::Empty("provider_id"));
        }
        if config.group_attribute.is_empty() {
            return Err(LdapConfigError::Empty("group_attribute"));
        }
        if !config.user_dn_template.contains(USERNAME_PLACEHOLDER) {
            return Err(LdapConfigError::MissingPlaceholder(
                config.user_dn_template,
            ));
        }
        tracing::info!(
            provider = %config.provider_id,
            template = %config.user_dn_template,
            "LDAP login plugin configured"
        );
        Ok(Self {
            config: Arc::new(config),
            connector,
        })
    }

    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    #[must_use]
    pub fn provider(&self, credentials: Credentials) -> Box<dyn LoginProvider> {
        Box::new(LdapProvider::new(
            Arc::clone(&self.config),
            Arc::clone(&self.connector),
            credentials,
        ))
    }
}
