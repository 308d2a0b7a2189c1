//! Tokens that carry a lightweight key and resolve the payload on demand.

use std::sync::{Arc, OnceLock};

use time::OffsetDateTime;

use super::{TokenError, TokenService};

type KeyOf<K, P> = dyn Fn(&P) -> K + Send + Sync;
type Resolve<K, P> = dyn Fn(&K) -> Result<P, TokenError> + Send + Sync;

/// Adapts a token service over `K` into one over `P`.
///
/// Only `key_of(payload)` is written into the token. The payload is looked
/// up with `resolve` the first time [`LazyToken::payload`] is called, so a
/// token always reflects the current state of the entity it names.
pub struct KeyedTokenService<K, P> {
    inner: Arc<dyn TokenService<K>>,
    key_of: Arc<KeyOf<K, P>>,
    resolve: Arc<Resolve<K, P>>,
}

impl<K, P> KeyedTokenService<K, P> {
    pub fn new(
        inner: Arc<dyn TokenService<K>>,
        key_of: impl Fn(&P) -> K + Send + Sync + 'static,
        resolve: impl Fn(&K) -> Result<P, TokenError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            key_of: Arc::new(key_of),
            resolve: Arc::new(resolve),
        }
    }

    #[must_use]
    pub fn create_token(&self, payload: &P, expires_at: OffsetDateTime) -> String {
        self.inner.create_token(&(self.key_of)(payload), expires_at)
    }

    /// # Errors
    ///
    /// Returns [`TokenError`] when the inner service rejects the token.
    /// Resolution failures surface later, from [`LazyToken::payload`].
    pub fn unpack_token(&self, token: &str) -> Result<LazyToken<K, P>, TokenError> {
        self.unpack_token_at(token, OffsetDateTime::now_utc())
    }

    /// # Errors
    ///
    /// See [`Self::unpack_token`].
    pub fn unpack_token_at(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<LazyToken<K, P>, TokenError> {
        let unpacked = self.inner.unpack_token_at(token, now)?;
        let expires_at = unpacked.expires_at();
        Ok(LazyToken {
            key: unpacked.into_payload(),
            expires_at,
            resolve: Arc::clone(&self.resolve),
            payload: OnceLock::new(),
        })
    }
}

/// An authentic, unexpired token whose payload is resolved at most once.
pub struct LazyToken<K, P> {
    key: K,
    expires_at: OffsetDateTime,
    resolve: Arc<Resolve<K, P>>,
    payload: OnceLock<P>,
}

impl<K, P> LazyToken<K, P> {
    #[must_use]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// Resolve the key on first call; later calls return the memoized value.
    ///
    /// # Errors
    ///
    /// Returns whatever `resolve` returns, typically
    /// [`TokenError::Unresolved`]. Failures are not memoized.
    pub fn payload(&self) -> Result<&P, TokenError> {
        if let Some(payload) = self.payload.get() {
            return Ok(payload);
        }
        let resolved = (self.resolve)(&self.key)?;
        Ok(self.payload.get_or_init(|| resolved))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::RwLock;
    use time::Duration;

    use super::*;
    use crate::token::{HmacSealer, I64TokenService, TokenCodec};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Profile {
        id: i64,
        name: String,
    }

    struct Fixture {
        service: KeyedTokenService<i64, Profile>,
        rows: Arc<RwLock<HashMap<i64, String>>>,
        lookups: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let codec = TokenCodec::new(Arc::new(HmacSealer::new(&[8u8; 32]).unwrap()));
        let rows = Arc::new(RwLock::new(HashMap::from([(7, "ann".to_owned())])));
        let lookups = Arc::new(AtomicUsize::new(0));

        let (r, l) = (Arc::clone(&rows), Arc::clone(&lookups));
        let service = KeyedTokenService::new(
            Arc::new(I64TokenService::int(codec)),
            |p: &Profile| p.id,
            move |id: &i64| {
                l.fetch_add(1, Ordering::SeqCst);
                r.read()
                    .get(id)
                    .map(|name| Profile {
                        id: *id,
                        name: name.clone(),
                    })
                    .ok_or_else(|| TokenError::Unresolved(format!("profile {id}")))
            },
        );
        Fixture {
            service,
            rows,
            lookups,
        }
    }

    #[test]
    fn payload_is_resolved_lazily_and_once() {
        let f = fixture();
        let profile = Profile {
            id: 7,
            name: "ann".to_owned(),
        };
        let token = f
            .service
            .create_token(&profile, OffsetDateTime::now_utc() + Duration::minutes(1));

        let lazy = f.service.unpack_token(&token).unwrap();
        assert_eq!(*lazy.key(), 7);
        assert_eq!(f.lookups.load(Ordering::SeqCst), 0);

        assert_eq!(lazy.payload().unwrap(), &profile);
        assert_eq!(lazy.payload().unwrap(), &profile);
        assert_eq!(f.lookups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn payload_reflects_current_state_not_mint_time() {
        let f = fixture();
        let minted_as = Profile {
            id: 7,
            name: "ann".to_owned(),
        };
        let token = f
            .service
            .create_token(&minted_as, OffsetDateTime::now_utc() + Duration::minutes(1));

        f.rows.write().insert(7, "annabel".to_owned());

        let lazy = f.service.unpack_token(&token).unwrap();
        assert_eq!(lazy.payload().unwrap().name, "annabel");
    }

    #[test]
    fn vanished_entity_is_unresolved() {
        let f = fixture();
        let token = f.service.create_token(
            &Profile {
                id: 7,
                name: "ann".to_owned(),
            },
            OffsetDateTime::now_utc() + Duration::minutes(1),
        );
        f.rows.write().clear();

        let lazy = f.service.unpack_token(&token).unwrap();
        assert!(matches!(lazy.payload(), Err(TokenError::Unresolved(_))));
    }
}
