//! Plugin entry point for signed requests.

use std::sync::Arc;

use http::header::AUTHORIZATION;
use http::{HeaderMap, Method};
use login_resolver_sdk::{AuthenticationError, FailureCause, LoginProvider, PublicKeyStore};
use modkit_crypto::signature::{
    AuthorizationHeader, PartialVerification, PendingCheck, SignatureError, SignatureVerifier,
    canonical_prefix,
};
use tracing::warn;

use super::provider::SignatureProvider;
use crate::config::{KeySource, SignatureLoginConfig};

/// Signature login plugin.
///
/// Verification spans two request phases, so the plugin does not hand out
/// a provider up front. [`Self::begin`] runs when headers arrive and
/// returns the per-request state; once every body byte has been fed,
/// [`Self::provider_for`] wraps the pending check in a [`LoginProvider`].
#[derive(Clone)]
pub struct SignatureLoginPlugin {
    config: Arc<SignatureLoginConfig>,
    keys: Arc<dyn PublicKeyStore>,
}

impl SignatureLoginPlugin {
    #[must_use]
    pub fn new(config: SignatureLoginConfig, keys: Arc<dyn PublicKeyStore>) -> Self {
        tracing::info!(
            provider = %config.provider_id,
            scheme = %config.scheme,
            key_source = ?config.key_source,
            "signature login plugin configured"
        );
        Self {
            config: Arc::new(config),
            keys,
        }
    }

    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.config.provider_id
    }

    #[must_use]
    pub fn config(&self) -> &SignatureLoginConfig {
        &self.config
    }

    pub(crate) fn fail(
        &self,
        identity: &str,
        cause: impl Into<FailureCause>,
    ) -> AuthenticationError {
        AuthenticationError::new(&self.config.provider_id, identity, cause)
    }

    /// Header phase: parse `Authorization`, build the signed prefix and set
    /// up the verifier. No signature check happens here.
    ///
    /// # Errors
    ///
    /// [`AuthenticationError`] when the header is missing or malformed, a
    /// required header is absent, or no key is registered for the
    /// identifier.
    pub async fn begin<P>(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<PartialVerification<P>, AuthenticationError> {
        let header = parse_authorization(headers, &self.config.scheme).map_err(|e| {
            warn!(error = %e, "rejected authorization header");
            self.fail("-", e)
        })?;
        let identity = header.identifier().to_owned();

        let required: Vec<&str> = self
            .config
            .required_headers
            .iter()
            .map(String::as_str)
            .collect();
        let prefix = canonical_prefix(method, path, headers, &required).map_err(|e| {
            warn!(identity = %identity, error = %e, "cannot build signed prefix");
            self.fail(&identity, e)
        })?;

        let verifier = match self.config.key_source {
            KeySource::Registered => {
                let key = self
                    .keys
                    .public_key(&identity)
                    .await
                    .map_err(|e| self.fail(&identity, e))?
                    .ok_or_else(|| {
                        warn!(identity = %identity, "no public key registered");
                        self.fail(&identity, FailureCause::AccountNotFound)
                    })?;
                SignatureVerifier::with_known_key(key, *header.signature(), &prefix)
            }
            KeySource::SelfDisclosed => SignatureVerifier::self_signed(
                *header.signature(),
                &prefix,
                self.config.max_buffered_body,
            )
            .map_err(|e| self.fail(&identity, e))?,
        };

        Ok(PartialVerification::new(header, verifier))
    }

    /// Completion phase: a provider whose login runs the signature check.
    #[must_use]
    pub fn provider_for(&self, pending: PendingCheck) -> Box<dyn LoginProvider> {
        Box::new(SignatureProvider::new(
            self.config.provider_id.clone(),
            self.config.key_source,
            pending,
        ))
    }
}

fn parse_authorization(
    headers: &HeaderMap,
    scheme: &str,
) -> Result<AuthorizationHeader, SignatureError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| SignatureError::MissingHeader(AUTHORIZATION.as_str().to_owned()))?
        .to_str()
        .map_err(|_| SignatureError::MalformedHeader("not visible ASCII".to_owned()))?;
    AuthorizationHeader::parse(value, scheme)
}
