//! Request pipeline stage for signed requests.
//!
//! The verification state lives in the request's [`RequestScope`] between
//! phases, so the header filter, the body reader and the handler that
//! decodes the payload need not know about each other.

use std::any::type_name;
use std::marker::PhantomData;

use http::Extensions;
use http::request::Parts;
use login_resolver_sdk::{AuthenticationError, LoginProvider};
use modkit_crypto::signature::{PartialVerification, VerifyingKey};
use modkit_security::{ContextError, RequestScope};
use thiserror::Error;

use super::service::SignatureLoginPlugin;

#[derive(Debug, Error)]
pub enum SignedRequestError {
    /// A later phase ran without the header phase. Pipeline misconfiguration.
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Authentication(#[from] AuthenticationError),
}

/// Drives a [`SignatureLoginPlugin`] across the phases of one request.
///
/// `P` is the decoded body type; for self-disclosed keys it is also where
/// the key comes from.
pub struct SignedRequestFilter<P> {
    plugin: SignatureLoginPlugin,
    _payload: PhantomData<fn() -> P>,
}

impl<P> Clone for SignedRequestFilter<P> {
    fn clone(&self) -> Self {
        Self {
            plugin: self.plugin.clone(),
            _payload: PhantomData,
        }
    }
}

fn not_installed<P>() -> ContextError {
    ContextError::NotInstalled {
        type_name: type_name::<PartialVerification<P>>(),
    }
}

impl<P: Send + 'static> SignedRequestFilter<P> {
    #[must_use]
    pub fn new(plugin: SignatureLoginPlugin) -> Self {
        Self {
            plugin,
            _payload: PhantomData,
        }
    }

    /// Header phase. Installs the verification state on the request.
    ///
    /// # Errors
    ///
    /// See [`SignatureLoginPlugin::begin`].
    pub async fn on_request(&self, parts: &mut Parts) -> Result<(), AuthenticationError> {
        let partial = self
            .plugin
            .begin::<P>(&parts.method, parts.uri.path(), &parts.headers)
            .await?;
        RequestScope::of(&mut parts.extensions)
            .install_once::<PartialVerification<P>>()
            .set(partial);
        Ok(())
    }

    /// Body phase. Call once per chunk, in order.
    ///
    /// # Errors
    ///
    /// - [`SignedRequestError::Context`] if [`Self::on_request`] did not run
    /// - [`SignedRequestError::Authentication`] if the buffered body would
    ///   exceed the configured cap
    pub fn on_body_chunk(
        &self,
        extensions: &mut Extensions,
        chunk: &[u8],
    ) -> Result<(), SignedRequestError> {
        let slot = RequestScope::of(extensions).require::<PartialVerification<P>>()?;
        slot.with_mut(|partial| {
            let partial = partial.ok_or_else(not_installed::<P>)?;
            partial.feed(chunk).map_err(|e| {
                tracing::warn!(
                    identity = %partial.identifier(),
                    error = %e,
                    "signed body rejected"
                );
                SignedRequestError::from(self.plugin.fail(partial.identifier(), e))
            })
        })
    }

    /// Payload phase. Attach the decoded body and, for self-disclosed keys,
    /// the key it carries.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotInstalled`] if [`Self::on_request`] did not run.
    pub fn on_payload(
        &self,
        extensions: &mut Extensions,
        payload: P,
        disclosed_key: Option<VerifyingKey>,
    ) -> Result<(), ContextError> {
        let slot = RequestScope::of(extensions).require::<PartialVerification<P>>()?;
        slot.with_mut(|partial| {
            let partial = partial.ok_or_else(not_installed::<P>)?;
            partial.bind_payload(payload, disclosed_key);
            Ok(())
        })
    }

    /// Completion. Removes the state and returns a provider that performs
    /// the check, together with the payload if one was bound.
    ///
    /// # Errors
    ///
    /// [`ContextError::NotInstalled`] if [`Self::on_request`] did not run
    /// or the request was already finished.
    pub fn finish(
        &self,
        extensions: &mut Extensions,
    ) -> Result<(Box<dyn LoginProvider>, Option<P>), ContextError> {
        let partial = RequestScope::of(extensions)
            .require::<PartialVerification<P>>()?
            .take()
            .ok_or_else(not_installed::<P>)?;
        let (pending, payload) = partial.into_parts();
        Ok((self.plugin.provider_for(pending), payload))
    }
}
