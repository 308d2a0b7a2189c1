pub mod provider;
pub mod service;
