pub mod filter;
pub mod provider;
pub mod service;
