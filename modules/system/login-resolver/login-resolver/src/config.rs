//! Configuration for the login resolver.

use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginResolverConfig {
    /// How long an issued bearer token stays valid.
    ///
    /// There is no revocation list; this window is the only bound on a
    /// leaked token.
    #[serde(with = "humantime_serde")]
    pub token_lifetime: Duration,

    /// Request and response header carrying the bearer token.
    pub token_header: String,

    /// Create, link and activate an account the first time an unknown
    /// `(provider_id, user_id)` pair logs in.
    pub auto_provision: bool,

    /// Hex-encoded token signing key, at least 32 bytes once decoded.
    ///
    /// When absent a random key is generated at startup and tokens do not
    /// survive a restart.
    pub token_key: Option<SecretString>,
}

impl Default for LoginResolverConfig {
    fn default() -> Self {
        Self {
            token_lifetime: Duration::from_secs(3600),
            token_header: "Token".to_owned(),
            auto_provision: false,
            token_key: None,
        }
    }
}
