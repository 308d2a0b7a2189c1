//! Single-use signature check.

use async_trait::async_trait;
use login_resolver_sdk::{AttributeKey, AuthenticationError, LoginProvider, LoginResult};
use modkit_crypto::signature::PendingCheck;
use tracing::{debug, warn};

use crate::config::KeySource;

/// Verifies a fully-fed request signature. Takes no password.
///
/// With registered keys the header identifier is the user id. With
/// self-disclosed keys the key itself is the identity: the user id is its
/// hex encoding and the claimed identifier is kept as the principal.
pub struct SignatureProvider {
    provider_id: String,
    key_source: KeySource,
    pending: PendingCheck,
}

impl SignatureProvider {
    #[must_use]
    pub fn new(provider_id: String, key_source: KeySource, pending: PendingCheck) -> Self {
        Self {
            provider_id,
            key_source,
            pending,
        }
    }
}

#[async_trait]
impl LoginProvider for SignatureProvider {
    fn provider_id(&self) -> &str {
        &self.provider_id
    }

    async fn login(self: Box<Self>) -> Result<LoginResult, AuthenticationError> {
        let Self {
            provider_id,
            key_source,
            pending,
        } = *self;
        let claimed = pending.identifier().to_owned();

        let (identifier, key) = pending.check().map_err(|e| {
            warn!(provider = %provider_id, identity = %claimed, error = %e, "signature rejected");
            AuthenticationError::new(&provider_id, &claimed, e)
        })?;
        debug!(provider = %provider_id, identity = %identifier, "signature verified");

        Ok(match key_source {
            KeySource::Registered => LoginResult::builder(provider_id, identifier).build(),
            KeySource::SelfDisclosed => {
                LoginResult::builder(provider_id, hex::encode(key.as_bytes()))
                    .text_opt(AttributeKey::Principal, Some(identifier))
                    .build()
            }
        })
    }
}
