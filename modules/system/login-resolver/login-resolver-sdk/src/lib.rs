#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Login Resolver SDK
//!
//! This crate provides the public API for the `login_resolver` module:
//!
//! - [`LoginResolverClient`] - Public API trait for consumers
//! - [`LoginProvider`] - Trait every login backend implements
//! - [`LoginResult`] / [`Attributes`] - Normalized identity assertion
//! - [`Account`] / [`AccountStore`] - Application accounts
//! - [`DirectoryConnector`], [`CredentialStore`], [`PublicKeyStore`] -
//!   contracts for the backends providers talk to
//! - [`AuthenticationError`], [`LoginResolverError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use login_resolver_sdk::LoginResolverClient;
//!
//! let provider = ldap_plugin.provider(credentials);
//! let outcome = resolver.login(provider).await?;
//! let ctx = outcome.security_context;
//! ```

pub mod account;
pub mod api;
pub mod attributes;
pub mod directory;
pub mod error;
pub mod models;
pub mod provider;
pub mod store;

#[cfg(feature = "testutil")]
pub mod testutil;

// Re-export main types at crate root
pub use account::{Account, AccountRecord, AccountStore};
pub use api::LoginResolverClient;
pub use attributes::{AttributeError, AttributeKey, AttributeKind, AttributeValue, Attributes};
pub use directory::{DirectoryConnection, DirectoryConnector, DirectoryEntry, SearchScope};
pub use error::{
    AccountError, AuthenticationError, DataAccessError, DirectoryError, FailureCause,
    LoginResolverError,
};
pub use models::{Credentials, LoginKey, LoginOutcome, LoginResult, LoginResultBuilder};
pub use provider::LoginProvider;
pub use store::{CredentialRecord, CredentialStore, PublicKeyStore};
