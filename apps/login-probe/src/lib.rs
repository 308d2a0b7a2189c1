#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Login probe
//!
//! Operator tool for checking the pieces of the login stack by hand:
//! password hashes, bearer tokens and LDAP-style logins against a
//! directory described in the configuration file.
//!
//! ```yaml
//! resolver:
//!   token_key: "<64 hex chars>"
//!   token_lifetime: 1h
//! ldap:
//!   user_dn_template: "uid={username},ou=people,dc=example,dc=com"
//! directory:
//!   - dn: "uid=ann,ou=people,dc=example,dc=com"
//!     password: "correct horse"
//!     attributes:
//!       displayName: ["Ann Example"]
//!       memberOf: ["cn=staff,ou=groups,dc=example,dc=com"]
//!   - dn: "cn=staff,ou=groups,dc=example,dc=com"
//! ```

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command, TokenCommand, UserArgs};
pub use commands::run;
pub use config::{ENV_PREFIX, FixtureEntry, ProbeConfig, load_config};
