//! Configuration for the LDAP login plugin.

use serde::Deserialize;

/// Placeholder replaced by the escaped username in [`LdapLoginConfig::user_dn_template`].
pub const USERNAME_PLACEHOLDER: &str = "{username}";

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LdapLoginConfig {
    /// Namespace of the user ids this plugin returns.
    pub provider_id: String,

    /// DN bound with the user's password, e.g.
    /// `uid={username},ou=people,dc=example,dc=com`.
    pub user_dn_template: String,

    /// Attribute holding a stable user id (`entryUUID`, `objectGUID`).
    /// When unset or missing on the entry the normalized bind DN is used.
    pub user_id_attribute: Option<String>,

    /// Attribute listing the groups an entry belongs to.
    pub group_attribute: String,

    /// Profile attribute names read after a successful bind.
    pub attributes: AttributeNames,
}

impl Default for LdapLoginConfig {
    fn default() -> Self {
        Self {
            provider_id: "ldap".to_owned(),
            user_dn_template: "uid={username},ou=people,dc=example,dc=com".to_owned(),
            user_id_attribute: None,
            group_attribute: "memberOf".to_owned(),
            attributes: AttributeNames::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeNames {
    pub display_name: String,
    pub given_name: String,
    pub surname: String,
    pub principal: String,
    pub email: String,
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            display_name: "displayName".to_owned(),
            given_name: "givenName".to_owned(),
            surname: "sn".to_owned(),
            principal: "userPrincipalName".to_owned(),
            email: "mail".to_owned(),
        }
    }
}

impl AttributeNames {
    pub(crate) fn all(&self) -> [&str; 5] {
        [
            &self.display_name,
            &self.given_name,
            &self.surname,
            &self.principal,
            &self.email,
        ]
    }
}
