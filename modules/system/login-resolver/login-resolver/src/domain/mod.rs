//! Domain layer for the login resolver.

pub mod accounts;
pub mod composite;
pub mod error;
pub mod local_client;
pub mod pipeline;
pub mod service;

pub use accounts::AccountResolver;
pub use composite::CompositeProvider;
pub use error::DomainError;
pub use local_client::LoginResolverLocalClient;
pub use pipeline::{TokenAuthenticator, TokenIssuer, bind_account};
pub use service::{Service, token_sealer};
