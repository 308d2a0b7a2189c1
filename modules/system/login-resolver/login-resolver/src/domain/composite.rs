//! Ordered fallback across several providers.

use async_trait::async_trait;
use login_resolver_sdk::{AuthenticationError, FailureCause, LoginProvider, LoginResult};
use tracing::{debug, warn};

/// Tries each provider in order; the first success wins.
///
/// If every provider fails, the last failure is returned. An empty chain
/// fails with [`FailureCause::NoProvider`].
pub struct CompositeProvider {
    providers: Vec<Box<dyn LoginProvider>>,
}

impl CompositeProvider {
    pub const PROVIDER_ID: &'static str = "composite";

    #[must_use]
    pub fn new(providers: Vec<Box<dyn LoginProvider>>) -> Self {
        Self { providers }
    }

    /// Append a provider to the end of the chain.
    #[must_use]
    pub fn then(mut self, provider: Box<dyn LoginProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl LoginProvider for CompositeProvider {
    fn provider_id(&self) -> &str {
        Self::PROVIDER_ID
    }

    async fn login(self: Box<Self>) -> Result<LoginResult, AuthenticationError> {
        let mut last = None;
        for provider in self.providers {
            let id = provider.provider_id().to_owned();
            match provider.login().await {
                Ok(result) => {
                    debug!(provider = %id, "composite login succeeded");
                    return Ok(result);
                }
                Err(e) => {
                    warn!(provider = %id, cause = %e.cause, "falling back to next provider");
                    last = Some(e);
                }
            }
        }
        Err(last.unwrap_or_else(|| {
            AuthenticationError::new(Self::PROVIDER_ID, "-", FailureCause::NoProvider)
        }))
    }
}
