#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! LDAP Login Plugin
//!
//! Authenticates users by binding to a directory server with their own
//! DN and password, then reads profile attributes and the transitive
//! closure of their group memberships.
//!
//! ## Configuration
//!
//! ```yaml
//! ldap:
//!   provider_id: ldap
//!   user_dn_template: "uid={username},ou=people,dc=example,dc=com"
//!   user_id_attribute: entryUUID
//!   group_attribute: memberOf
//!   attributes:
//!     display_name: displayName
//!     email: mail
//! ```

pub mod config;
pub mod domain;

pub use config::LdapLoginConfig;
pub use domain::groups::resolve_group_closure;
pub use domain::provider::LdapProvider;
pub use domain::service::{LdapConfigError, LdapLoginPlugin};
