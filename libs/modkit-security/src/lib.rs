#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
pub mod context;
pub mod scope;

pub use context::{SecurityContext, SecurityContextBuilder};
pub use scope::{ContextError, RequestScope, Slot};
