#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Database Login Plugin
//!
//! Looks the username up in a [`CredentialStore`](login_resolver_sdk::CredentialStore)
//! and verifies the password against the stored PBKDF2 hash. Each store
//! call is bounded by `query_timeout`.
//!
//! ## Configuration
//!
//! ```yaml
//! database:
//!   provider_id: database
//!   query_timeout: 10s
//!   hash_algorithm: pbkdf2
//!   hash_rounds: 10000
//!   rehash_on_login: true
//! ```

pub mod config;
pub mod domain;

pub use config::DbLoginConfig;
pub use domain::provider::DatabaseProvider;
pub use domain::service::{DbConfigError, DbLoginPlugin};
