//! Store implementations shipped with the resolver.

pub mod memory;

pub use memory::InMemoryAccountStore;
