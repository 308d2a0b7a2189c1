//! Probe configuration: YAML file plus `LOGIN_PROBE__*` overrides.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use ldap_login_plugin::LdapLoginConfig;
use login_resolver::LoginResolverConfig;
use login_resolver_sdk::DirectoryEntry;
use login_resolver_sdk::testutil::InMemoryDirectory;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

/// Environment prefix; nested keys are separated by `__`, e.g.
/// `LOGIN_PROBE__RESOLVER__TOKEN_LIFETIME=5m`.
pub const ENV_PREFIX: &str = "LOGIN_PROBE__";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub resolver: LoginResolverConfig,
    pub ldap: LdapLoginConfig,
    /// Entries served by the in-memory directory the login commands run
    /// against.
    pub directory: Vec<FixtureEntry>,
}

/// One directory entry. Entries with a password can bind.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureEntry {
    pub dn: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, Vec<String>>,
}

impl ProbeConfig {
    /// Build the in-memory directory described by [`Self::directory`].
    #[must_use]
    pub fn build_directory(&self) -> InMemoryDirectory {
        let directory = InMemoryDirectory::new();
        for fixture in &self.directory {
            let entry = fixture
                .attributes
                .iter()
                .fold(DirectoryEntry::new(&fixture.dn), |entry, (name, values)| {
                    entry.with_values(name, values.iter().cloned())
                });
            match &fixture.password {
                Some(password) => directory.add_user(entry, password.expose_secret()),
                None => directory.add_entry(entry),
            }
            if fixture.disabled {
                directory.disable(&fixture.dn);
            }
        }
        directory
    }
}

/// Load `path` (a missing file means defaults) and apply environment
/// overrides.
///
/// # Errors
///
/// Returns an error if the file or an override does not deserialize.
pub fn load_config(path: &Path) -> anyhow::Result<ProbeConfig> {
    Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .with_context(|| format!("loading configuration from {}", path.display()))
}
