#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Login Resolver Module
//!
//! Runs a [`LoginProvider`](login_resolver_sdk::LoginProvider), maps the
//! `(provider_id, user_id)` it returns to an application account and
//! issues a bearer token naming that account. Later requests present the
//! token and get the account back, read fresh from the store.
//!
//! ## Configuration
//!
//! ```yaml
//! login_resolver:
//!   token_lifetime: 1h
//!   token_header: Token
//!   auto_provision: false
//!   token_key: "<64 hex chars>"
//! ```

pub mod config;
pub mod domain;
pub mod infra;

pub use config::LoginResolverConfig;
pub use domain::{
    AccountResolver, CompositeProvider, DomainError, LoginResolverLocalClient, Service,
    TokenAuthenticator, TokenIssuer, bind_account, token_sealer,
};
pub use infra::InMemoryAccountStore;
