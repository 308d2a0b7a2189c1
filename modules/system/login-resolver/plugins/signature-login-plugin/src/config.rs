//! Configuration for the signature login plugin.

use modkit_crypto::signature::DEFAULT_MAX_BUFFERED_BODY;
use serde::Deserialize;

/// Where the verifying key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KeySource {
    /// Looked up in the public key store by the header's identifier before
    /// the body is read. The body is hashed as it streams.
    #[default]
    Registered,
    /// Carried inside the request body. The body is buffered until the
    /// payload is decoded and hands over the key.
    SelfDisclosed,
}

/// Plugin configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SignatureLoginConfig {
    /// Namespace of the user ids this plugin returns.
    pub provider_id: String,

    /// Scheme expected in `Authorization: <scheme> <identifier>:<signature>`.
    pub scheme: String,

    /// Headers covered by the signature, besides method and path.
    pub required_headers: Vec<String>,

    pub key_source: KeySource,

    /// Cap on body bytes buffered for [`KeySource::SelfDisclosed`].
    pub max_buffered_body: usize,
}

impl Default for SignatureLoginConfig {
    fn default() -> Self {
        Self {
            provider_id: "signature".to_owned(),
            scheme: "Signed".to_owned(),
            required_headers: vec!["date".to_owned(), "host".to_owned()],
            key_source: KeySource::Registered,
            max_buffered_body: DEFAULT_MAX_BUFFERED_BODY,
        }
    }
}
