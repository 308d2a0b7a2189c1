pub mod dn;
pub mod groups;
pub mod provider;
pub mod service;
