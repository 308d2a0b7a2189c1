//! Login resolver service: runs providers, resolves accounts and issues
//! bearer tokens.

use std::sync::Arc;

use http::HeaderName;
use login_resolver_sdk::{
    Account, AccountError, AccountStore, LoginOutcome, LoginProvider, LoginResult,
};
use modkit_crypto::token::{HmacSealer, KeyedTokenService, TokenCodec, UuidTokenService};
use modkit_crypto::{TokenError, TokenSealer};
use modkit_security::SecurityContext;
use secrecy::ExposeSecret;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use super::accounts::AccountResolver;
use super::error::DomainError;
use crate::config::LoginResolverConfig;

/// Login resolver service.
pub struct Service {
    config: LoginResolverConfig,
    token_header: HeaderName,
    accounts: AccountResolver,
    tokens: KeyedTokenService<Uuid, Account>,
}

/// Sealer for the configured token key, or a random one when unset.
///
/// # Errors
///
/// [`DomainError::InvalidConfig`] if the key is not hex,
/// [`DomainError::Token`] if it is too short.
pub fn token_sealer(config: &LoginResolverConfig) -> Result<Arc<dyn TokenSealer>, DomainError> {
    let sealer = match &config.token_key {
        Some(key) => {
            let bytes = Zeroizing::new(
                hex::decode(key.expose_secret().trim())
                    .map_err(|e| DomainError::InvalidConfig(format!("token_key: {e}")))?,
            );
            HmacSealer::new(&bytes)?
        }
        None => {
            warn!("no token_key configured; tokens will not survive a restart");
            HmacSealer::random()?
        }
    };
    Ok(Arc::new(sealer))
}

/// Token payload resolution: the token names an account id, the current
/// row decides whether it still authenticates.
fn resolve_account(store: &dyn AccountStore, id: Uuid) -> Result<Account, TokenError> {
    let record = store
        .find_by_id(id)
        .map_err(|e| TokenError::SourceUnavailable(e.to_string()))?;
    match record.and_then(login_resolver_sdk::AccountRecord::visible) {
        Some(account) if account.active => Ok(account),
        Some(_) => Err(TokenError::Unresolved(format!("account {id} is inactive"))),
        None => Err(TokenError::Unresolved(format!("account {id} not found"))),
    }
}

impl Service {
    /// # Errors
    ///
    /// [`DomainError::InvalidConfig`] for an unusable token header or key,
    /// [`DomainError::Token`] if the key is too short.
    pub fn new(
        config: LoginResolverConfig,
        store: Arc<dyn AccountStore>,
    ) -> Result<Self, DomainError> {
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| DomainError::InvalidConfig(format!("token_header: {e}")))?;
        if config.token_lifetime.is_zero() {
            return Err(DomainError::InvalidConfig(
                "token_lifetime must be greater than zero".to_owned(),
            ));
        }

        let codec = TokenCodec::new(token_sealer(&config)?);
        let lookup = Arc::clone(&store);
        let tokens = KeyedTokenService::new(
            Arc::new(UuidTokenService::uuid(codec)),
            |account: &Account| account.id,
            move |id: &Uuid| resolve_account(lookup.as_ref(), *id),
        );

        info!(
            header = %token_header,
            lifetime = ?config.token_lifetime,
            auto_provision = config.auto_provision,
            "login resolver configured"
        );

        Ok(Self {
            config,
            token_header,
            accounts: AccountResolver::new(store),
            tokens,
        })
    }

    #[must_use]
    pub fn accounts(&self) -> &AccountResolver {
        &self.accounts
    }

    #[must_use]
    pub fn token_header(&self) -> &HeaderName {
        &self.token_header
    }

    /// Run `provider` and turn its identity into an authenticated context.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Authentication`] if the provider rejected the login
    /// - [`DomainError::Account`] if no account is linked (and provisioning
    ///   is off), the account is inactive, or the store failed
    #[tracing::instrument(skip_all, fields(provider = %provider.provider_id()))]
    pub async fn login(
        &self,
        provider: Box<dyn LoginProvider>,
    ) -> Result<LoginOutcome, DomainError> {
        let result = provider.login().await.inspect_err(|e| {
            warn!(identity = %e.identity, cause = %e.cause, "authentication failed");
        })?;
        let account = self.resolve(&result)?;

        if !account.active {
            warn!(account_id = %account.id, login = %result.key(), "login to inactive account");
            return Err(AccountError::Inactive(account.id).into());
        }

        let token = self.issue_token(&account);
        let security_context = SecurityContext::builder()
            .account_id(account.id)
            .login(result.provider_id(), result.user_id())
            .groups(result.groups().to_vec())
            .bearer_token(token)
            .build();
        info!(account_id = %account.id, user_id = %result.user_id(), "login succeeded");

        Ok(LoginOutcome {
            account,
            security_context,
        })
    }

    fn resolve(&self, result: &LoginResult) -> Result<Account, DomainError> {
        match self.accounts.lookup(result) {
            Ok(account) => Ok(account),
            Err(AccountError::NotLinked(key)) if self.config.auto_provision => {
                info!(login = %key, "provisioning account for first login");
                Ok(self.accounts.provision(result)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Mint a bearer token naming `account`, valid for the configured
    /// lifetime.
    #[must_use]
    pub fn issue_token(&self, account: &Account) -> String {
        self.tokens.create_token(
            account,
            OffsetDateTime::now_utc() + self.config.token_lifetime,
        )
    }

    /// Account named by a bearer token, read from the store now.
    ///
    /// # Errors
    ///
    /// [`DomainError::Token`] if the token is forged, malformed, expired or
    /// its account is gone or inactive.
    pub fn resolve_token(&self, token: &str) -> Result<Account, DomainError> {
        let lazy = self.tokens.unpack_token(token).inspect_err(|e| {
            warn!(error = %e, "bearer token rejected");
        })?;
        let account = lazy.payload().inspect_err(|e| {
            warn!(account_id = %lazy.key(), error = %e, "bearer token does not resolve");
        })?;
        Ok(account.clone())
    }

    /// Validate a bearer token and return the identity it names.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_token`].
    pub fn authenticate(&self, token: &str) -> Result<SecurityContext, DomainError> {
        let account = self.resolve_token(token)?;
        Ok(SecurityContext::builder()
            .account_id(account.id)
            .bearer_token(token.to_owned())
            .build())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::infra::InMemoryAccountStore;

    fn service(config: LoginResolverConfig) -> Result<Service, DomainError> {
        Service::new(config, Arc::new(InMemoryAccountStore::new()))
    }

    #[test]
    fn configured_key_must_be_hex() {
        let res = service(LoginResolverConfig {
            token_key: Some(SecretString::from("not hex".to_owned())),
            ..LoginResolverConfig::default()
        });
        assert!(matches!(res, Err(DomainError::InvalidConfig(m)) if m.starts_with("token_key")));
    }

    #[test]
    fn configured_key_must_be_long_enough() {
        let res = service(LoginResolverConfig {
            token_key: Some(SecretString::from("00ff".to_owned())),
            ..LoginResolverConfig::default()
        });
        assert!(matches!(
            res,
            Err(DomainError::Token(TokenError::WeakKey { len: 2, .. }))
        ));
    }

    #[test]
    fn header_name_is_validated() {
        let res = service(LoginResolverConfig {
            token_header: "bad header".to_owned(),
            ..LoginResolverConfig::default()
        });
        assert!(matches!(res, Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn zero_lifetime_is_rejected() {
        let res = service(LoginResolverConfig {
            token_lifetime: std::time::Duration::ZERO,
            ..LoginResolverConfig::default()
        });
        assert!(matches!(res, Err(DomainError::InvalidConfig(_))));
    }

    #[test]
    fn tokens_from_a_shared_key_survive_a_restart() {
        let key = "11".repeat(32);
        let config = LoginResolverConfig {
            token_key: Some(SecretString::from(key)),
            ..LoginResolverConfig::default()
        };
        let store = Arc::new(InMemoryAccountStore::new());
        let first = Service::new(config.clone(), store.clone()).unwrap();
        let account = first.accounts().create_account("Ann").unwrap();
        store.set_active(account.id, true).unwrap();

        let token = first.issue_token(&account);
        let second = Service::new(config, store).unwrap();
        assert_eq!(second.resolve_token(&token).unwrap().id, account.id);
    }

    #[test]
    fn random_keys_do_not_interoperate() {
        let store = Arc::new(InMemoryAccountStore::new());
        let first = Service::new(LoginResolverConfig::default(), store.clone()).unwrap();
        let second = Service::new(LoginResolverConfig::default(), store.clone()).unwrap();
        let account = first.accounts().create_account("Ann").unwrap();
        store.set_active(account.id, true).unwrap();

        let token = first.issue_token(&account);
        assert!(matches!(
            second.resolve_token(&token),
            Err(DomainError::Token(TokenError::Invalid(_)))
        ));
    }
}
