//! Single-use LDAP login.

use std::sync::Arc;

use async_trait::async_trait;
use login_resolver_sdk::{
    AttributeKey, AuthenticationError, Credentials, DirectoryConnection, DirectoryConnector,
    DirectoryEntry, DirectoryError, FailureCause, LoginProvider, LoginResult, SearchScope,
};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use super::dn::user_dn;
use super::groups::resolve_group_closure;
use crate::config::LdapLoginConfig;

/// Authenticates by binding as the user.
///
/// A successful bind is the only proof of valid credentials. Disabled or
/// locked accounts are refused by the server at bind time, so no separate
/// status attribute is consulted.
pub struct LdapProvider {
    config: Arc<LdapLoginConfig>,
    connector: Arc<dyn DirectoryConnector>,
    credentials: Credentials,
}

impl LdapProvider {
    #[must_use]
    pub fn new(
        config: Arc<LdapLoginConfig>,
        connector: Arc<dyn DirectoryConnector>,
        credentials: Credentials,
    ) -> Self {
        Self {
            config,
            connector,
            credentials,
        }
    }

    fn fail(&self, cause: impl Into<FailureCause>) -> AuthenticationError {
        AuthenticationError::new(&self.config.provider_id, &self.credentials.username, cause)
    }

    async fn authenticate(
        &self,
        conn: &mut dyn DirectoryConnection,
        dn: &str,
    ) -> Result<LoginResult, AuthenticationError> {
        conn.bind(dn, &self.credentials.password)
            .await
            .map_err(|e| match e {
                DirectoryError::BindRejected(reason) => {
                    warn!(%reason, "bind rejected");
                    self.fail(FailureCause::BadCredentials)
                }
                other => self.fail(other),
            })?;

        let entry = self.read_entry(conn, dn).await;
        let group_attribute = &self.config.group_attribute;
        let groups =
            resolve_group_closure(conn, entry.values(group_attribute), group_attribute).await;
        debug!(groups = groups.len(), "group closure resolved");

        Ok(self.build_result(dn, &entry, groups))
    }

    /// Best effort: a failed read yields an entry with no attributes.
    async fn read_entry(&self, conn: &mut dyn DirectoryConnection, dn: &str) -> DirectoryEntry {
        let names = &self.config.attributes;
        let mut wanted: Vec<&str> = names.all().to_vec();
        wanted.push(&self.config.group_attribute);
        if let Some(id_attr) = &self.config.user_id_attribute {
            wanted.push(id_attr);
        }

        match conn
            .search(dn, "(objectClass=*)", SearchScope::Base, &wanted)
            .await
        {
            Ok(entries) => entries.into_iter().next().unwrap_or_else(|| {
                debug!("bound entry not visible to its own search");
                DirectoryEntry::new(dn)
            }),
            Err(e) => {
                warn!(error = %e, "attribute read failed; continuing without attributes");
                DirectoryEntry::new(dn)
            }
        }
    }

    fn build_result(&self, dn: &str, entry: &DirectoryEntry, groups: Vec<String>) -> LoginResult {
        let names = &self.config.attributes;
        let user_id = self
            .config
            .user_id_attribute
            .as_deref()
            .and_then(|attr| entry.first(attr))
            .map_or_else(|| dn.to_ascii_lowercase(), str::to_owned);

        let text = |attr: &str| entry.first(attr).map(str::to_owned);
        let builder = LoginResult::builder(&self.config.provider_id, user_id)
            .text_opt(AttributeKey::DisplayName, text(&names.display_name))
            .text_opt(AttributeKey::GivenName, text(&names.given_name))
            .text_opt(AttributeKey::Surname, text(&names.surname))
            .text_opt(AttributeKey::Principal, text(&names.principal))
            .text_opt(AttributeKey::Email, text(&names.email));

        builder.groups(groups).build()
    }

    #[tracing::instrument(
        skip_all,
        fields(provider = %self.config.provider_id, identity = %self.credentials.username)
    )]
    async fn run(&self) -> Result<LoginResult, AuthenticationError> {
        // An empty password is an unauthenticated bind, which most servers
        // accept.
        if self.credentials.password.expose_secret().is_empty() {
            warn!("empty password rejected before bind");
            return Err(self.fail(FailureCause::BadCredentials));
        }
        if self.credentials.username.trim().is_empty() {
            warn!("empty username rejected before bind");
            return Err(self.fail(FailureCause::BadCredentials));
        }

        let dn = user_dn(&self.config.user_dn_template, &self.credentials.username);
        let mut conn = self.connector.connect().await.map_err(|e| {
            warn!(error = %e, "directory connection failed");
            self.fail(e)
        })?;

        let outcome = self.authenticate(conn.as_mut(), &dn).await;

        if let Err(e) = conn.unbind().await {
            warn!(error = %e, "unbind failed");
        }
        outcome
    }
}

#[async_trait]
impl LoginProvider for LdapProvider {
    fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    async fn login(self: Box<Self>) -> Result<LoginResult, AuthenticationError> {
        self.run().await
    }
}
