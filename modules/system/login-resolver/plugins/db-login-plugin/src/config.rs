//! Configuration for the database login plugin.

use std::time::Duration;

use modkit_crypto::HashAlgorithm;
use modkit_crypto::password::DEFAULT_ROUNDS;
use serde::Deserialize;

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbLoginConfig {
    /// Namespace of the user ids this plugin returns.
    pub provider_id: String,

    /// Ceiling on each credential store call.
    #[serde(with = "humantime_serde")]
    pub query_timeout: Duration,

    /// Algorithm tag for newly derived hashes (`pbkdf2`, `pbkdf2-sha512`).
    pub hash_algorithm: HashAlgorithm,

    /// PBKDF2 rounds for newly derived hashes.
    pub hash_rounds: u32,

    /// Re-derive stored hashes that use weaker parameters after a
    /// successful login.
    pub rehash_on_login: bool,
}

impl Default for DbLoginConfig {
    fn default() -> Self {
        Self {
            provider_id: "database".to_owned(),
            query_timeout: Duration::from_secs(10),
            hash_algorithm: HashAlgorithm::Pbkdf2Sha256,
            hash_rounds: DEFAULT_ROUNDS,
            rehash_on_login: false,
        }
    }
}
