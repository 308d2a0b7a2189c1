use secrecy::SecretString;
use uuid::Uuid;

/// `SecurityContext` describes who is behind the current request.
///
/// Built by the login resolver once a provider or a bearer token has been
/// accepted, and stored in the request scope for downstream handlers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SecurityContext {
    /// Application account the caller resolved to.
    account_id: Uuid,
    /// Provider namespace that authenticated the caller (e.g. "ldap").
    /// Absent when the request authenticated with a bearer token only.
    provider_id: Option<String>,
    /// Provider-scoped user identifier. Unique only within `provider_id`.
    login_user_id: Option<String>,
    /// Group memberships asserted by the provider.
    #[serde(default)]
    groups: Vec<String>,
    /// Bearer token presented or issued for this request. Never serialized.
    #[serde(skip)]
    bearer_token: Option<SecretString>,
}

impl SecurityContext {
    #[must_use]
    pub fn builder() -> SecurityContextBuilder {
        SecurityContextBuilder::default()
    }

    /// Context with a nil account and nothing else.
    #[must_use]
    pub fn anonymous() -> Self {
        SecurityContextBuilder::default().build()
    }

    #[must_use]
    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.account_id.is_nil()
    }

    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    #[must_use]
    pub fn login_user_id(&self) -> Option<&str> {
        self.login_user_id.as_deref()
    }

    #[must_use]
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Case-insensitive group membership check.
    #[must_use]
    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.eq_ignore_ascii_case(group))
    }

    #[must_use]
    pub fn bearer_token(&self) -> Option<&SecretString> {
        self.bearer_token.as_ref()
    }
}

#[derive(Default)]
pub struct SecurityContextBuilder {
    account_id: Option<Uuid>,
    provider_id: Option<String>,
    login_user_id: Option<String>,
    groups: Vec<String>,
    bearer_token: Option<SecretString>,
}

impl SecurityContextBuilder {
    #[must_use]
    pub fn account_id(mut self, account_id: Uuid) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Record the `(provider_id, user_id)` pair the account was resolved from.
    #[must_use]
    pub fn login(mut self, provider_id: &str, user_id: &str) -> Self {
        self.provider_id = Some(provider_id.to_owned());
        self.login_user_id = Some(user_id.to_owned());
        self
    }

    #[must_use]
    pub fn groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn build(self) -> SecurityContext {
        SecurityContext {
            account_id: self.account_id.unwrap_or_default(),
            provider_id: self.provider_id,
            login_user_id: self.login_user_id,
            groups: self.groups,
            bearer_token: self.bearer_token,
        }
    }
}
