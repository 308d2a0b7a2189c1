//! Domain models for the login resolver module.

use std::fmt;

use modkit_security::SecurityContext;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::account::Account;
use crate::attributes::{AttributeError, AttributeKey, AttributeValue, Attributes};

/// Username and password as typed by the user.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Composite key accounts are linked by.
///
/// `user_id` alone is only unique inside `provider_id`'s namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoginKey {
    pub provider_id: String,
    pub user_id: String,
}

impl LoginKey {
    #[must_use]
    pub fn new(provider_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            user_id: user_id.into(),
        }
    }
}

impl fmt::Display for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider_id, self.user_id)
    }
}

/// Identity asserted by a provider after a successful login.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResult {
    provider_id: String,
    user_id: String,
    attributes: Attributes,
}

impl LoginResult {
    #[must_use]
    pub fn builder(
        provider_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> LoginResultBuilder {
        LoginResultBuilder {
            provider_id: provider_id.into(),
            user_id: user_id.into(),
            attributes: Attributes::new(),
        }
    }

    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn key(&self) -> LoginKey {
        LoginKey::new(self.provider_id.clone(), self.user_id.clone())
    }

    /// Best human-readable name for a newly provisioned account.
    #[must_use]
    pub fn display_title(&self) -> &str {
        [
            AttributeKey::DisplayName,
            AttributeKey::Principal,
            AttributeKey::Email,
        ]
        .into_iter()
        .find_map(|key| self.attributes.text(key))
        .unwrap_or(&self.user_id)
    }

    #[must_use]
    pub fn groups(&self) -> &[String] {
        self.attributes
            .text_list(AttributeKey::Groups)
            .unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct LoginResultBuilder {
    provider_id: String,
    user_id: String,
    attributes: Attributes,
}

impl LoginResultBuilder {
    /// # Errors
    ///
    /// [`AttributeError::KindMismatch`] if `value` does not fit `key`.
    pub fn attribute(
        mut self,
        key: AttributeKey,
        value: impl Into<AttributeValue>,
    ) -> Result<Self, AttributeError> {
        self.attributes.insert(key, value)?;
        Ok(self)
    }

    /// Text attribute set only when `value` is present and non-empty.
    /// Ignored for keys that are not text-valued.
    #[must_use]
    pub fn text_opt(mut self, key: AttributeKey, value: Option<String>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.attributes.set_text(key, v);
        }
        self
    }

    /// Backend's own numeric user id.
    #[must_use]
    pub fn numeric_id(mut self, id: i64) -> Self {
        self.attributes.set_number(AttributeKey::NumericId, id);
        self
    }

    /// Transitive group memberships.
    #[must_use]
    pub fn groups(mut self, groups: Vec<String>) -> Self {
        self.attributes.set_groups(groups);
        self
    }

    #[must_use]
    pub fn build(self) -> LoginResult {
        LoginResult {
            provider_id: self.provider_id,
            user_id: self.user_id,
            attributes: self.attributes,
        }
    }
}

/// What a successful login hands back to the caller.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub account: Account,
    /// Carries the freshly minted bearer token.
    pub security_context: SecurityContext,
}
