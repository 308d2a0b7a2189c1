//! Local (in-process) client for the login resolver.

use std::sync::Arc;

use async_trait::async_trait;
use login_resolver_sdk::{LoginOutcome, LoginProvider, LoginResolverClient, LoginResolverError};
use modkit_security::SecurityContext;

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct LoginResolverLocalClient {
    svc: Arc<Service>,
}

impl LoginResolverLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> LoginResolverError {
    tracing::error!(operation = op, error = %e, "login_resolver call failed");
    e.into()
}

#[async_trait]
impl LoginResolverClient for LoginResolverLocalClient {
    async fn login(
        &self,
        provider: Box<dyn LoginProvider>,
    ) -> Result<LoginOutcome, LoginResolverError> {
        self.svc
            .login(provider)
            .await
            .map_err(|e| log_and_convert("login", e))
    }

    async fn authenticate(
        &self,
        bearer_token: &str,
    ) -> Result<SecurityContext, LoginResolverError> {
        self.svc
            .authenticate(bearer_token)
            .map_err(|e| log_and_convert("authenticate", e))
    }
}
