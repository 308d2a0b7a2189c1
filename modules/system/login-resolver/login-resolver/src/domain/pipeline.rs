//! Request pipeline stages for bearer tokens.
//!
//! [`TokenAuthenticator`] runs first and installs the [`Account`] slot on
//! every request, filled when a valid token is presented. A login handler
//! fills the same slot with [`bind_account`]. [`TokenIssuer`] runs on the
//! way out and writes a fresh token whenever the slot holds an account, so
//! an active session keeps sliding forward.

use std::sync::Arc;

use http::request::Parts;
use http::{Extensions, HeaderMap, HeaderValue};
use login_resolver_sdk::Account;
use modkit_crypto::TokenError;
use modkit_security::{RequestScope, SecurityContext};
use tracing::debug;

use super::{DomainError, Service};

/// Put `account` in the request's account slot, installing it if needed.
pub fn bind_account(extensions: &mut Extensions, account: Account) {
    RequestScope::of(extensions)
        .install_once::<Account>()
        .set(account);
}

/// Reads the bearer token header and resolves the account it names.
#[derive(Clone)]
pub struct TokenAuthenticator {
    svc: Arc<Service>,
}

impl TokenAuthenticator {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }

    /// Install the account and [`SecurityContext`] slots. A request without
    /// the header stays anonymous and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`DomainError::Token`] if a token is present but does not
    /// authenticate.
    pub fn on_request(&self, parts: &mut Parts) -> Result<Option<Account>, DomainError> {
        let scope = RequestScope::of(&mut parts.extensions);
        let account_slot = scope.install_once::<Account>();
        let context_slot = scope.install_once::<SecurityContext>();

        let Some(value) = parts.headers.get(self.svc.token_header()) else {
            debug!("no bearer token; request is anonymous");
            context_slot.set(SecurityContext::anonymous());
            return Ok(None);
        };
        let token = value
            .to_str()
            .map_err(|_| TokenError::Invalid("header is not visible ASCII".to_owned()))?;

        let account = self.svc.resolve_token(token)?;
        context_slot.set(
            SecurityContext::builder()
                .account_id(account.id)
                .bearer_token(token.to_owned())
                .build(),
        );
        account_slot.set(account.clone());
        Ok(Some(account))
    }
}

/// Writes a fresh bearer token for the request's account into the response.
#[derive(Clone)]
pub struct TokenIssuer {
    svc: Arc<Service>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }

    /// Returns whether a token was written.
    ///
    /// # Errors
    ///
    /// [`DomainError::Context`] if the account slot was never installed,
    /// meaning [`TokenAuthenticator`] did not run for this request.
    pub fn on_response(
        &self,
        request_extensions: &mut Extensions,
        response_headers: &mut HeaderMap,
    ) -> Result<bool, DomainError> {
        let Some(account) = RequestScope::of(request_extensions).get_value::<Account>()? else {
            return Ok(false);
        };
        let token = self.svc.issue_token(&account);
        let value = HeaderValue::from_str(&token)
            .map_err(|e| DomainError::Internal(format!("token is not a header value: {e}")))?;
        response_headers.insert(self.svc.token_header().clone(), value);
        debug!(account_id = %account.id, "bearer token issued");
        Ok(true)
    }
}
