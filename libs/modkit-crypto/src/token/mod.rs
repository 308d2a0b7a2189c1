//! Expiring bearer tokens.
//!
//! [`TokenCodec`] frames raw payload bytes with a version and an expiry and
//! hands the buffer to a [`TokenSealer`]. Typed services
//! ([`CodecTokenService`], [`KeyedTokenService`]) sit on top so UUID,
//! integer and string tokens share one framing implementation.

mod codec;
mod error;
mod keyed;
mod payload;
mod sealer;

pub use codec::{TOKEN_FORMAT_VERSION, TokenCodec, UnpackedToken};
pub use error::TokenError;
pub use keyed::{KeyedTokenService, LazyToken};
pub use payload::{
    CodecTokenService, FnPayloadCodec, I64Codec, I64TokenService, PayloadCodec, StringCodec,
    StringTokenService, TokenService, UuidCodec, UuidTokenService,
};
pub use sealer::{HmacSealer, TokenSealer};
