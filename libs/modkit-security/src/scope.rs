//! Request-scoped typed store.
//!
//! A [`RequestScope`] lives for one request. Independent filters share a
//! value by asking for the slot of its type: the first caller creates the
//! slot, later callers get the same one back. Retrieval through
//! [`RequestScope::get_value`] reports a missing slot as a configuration
//! error, since it means the filter that installs it never ran.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A required slot was never installed on this request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("request context slot for `{type_name}` is not installed")]
    NotInstalled { type_name: &'static str },
}

/// Single-value container shared by everything that installed it.
pub struct Slot<T> {
    value: Mutex<Option<T>>,
}

impl<T> Slot<T> {
    fn empty() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    pub fn set(&self, value: T) {
        *self.value.lock() = Some(value);
    }

    /// Remove and return the stored value.
    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.value.lock().is_some()
    }

    /// Apply `f` to the stored value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        f(self.value.lock().as_ref())
    }

    /// Mutate the stored value in place.
    pub fn with_mut<R>(&self, f: impl FnOnce(Option<&mut T>) -> R) -> R {
        f(self.value.lock().as_mut())
    }
}

impl<T: Clone> Slot<T> {
    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }
}

impl<T> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("type", &type_name::<T>())
            .field("set", &self.is_set())
            .finish()
    }
}

/// Per-request map from payload type to its [`Slot`].
#[derive(Clone, Default)]
pub struct RequestScope {
    slots: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl RequestScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope attached to a request's extensions, created on first use.
    pub fn of(extensions: &mut http::Extensions) -> &mut Self {
        extensions.get_or_insert_default::<Self>()
    }

    /// Return the slot for `T`, creating an empty one if absent.
    ///
    /// Calling this again for the same `T` returns the same slot; an
    /// existing value is never replaced.
    pub fn install_once<T: Send + 'static>(&mut self) -> Arc<Slot<T>> {
        if let Some(existing) = self.slot::<T>() {
            return existing;
        }
        let slot = Arc::new(Slot::<T>::empty());
        self.slots.insert(
            TypeId::of::<T>(),
            Arc::clone(&slot) as Arc<dyn Any + Send + Sync>,
        );
        slot
    }

    /// The slot for `T`, if some filter installed it.
    #[must_use]
    pub fn slot<T: Send + 'static>(&self) -> Option<Arc<Slot<T>>> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|any| Arc::clone(any).downcast::<Slot<T>>().ok())
    }

    /// The slot for `T`.
    ///
    /// # Errors
    /// [`ContextError::NotInstalled`] when no slot for `T` exists.
    pub fn require<T: Send + 'static>(&self) -> Result<Arc<Slot<T>>, ContextError> {
        self.slot::<T>().ok_or(ContextError::NotInstalled {
            type_name: type_name::<T>(),
        })
    }

    /// Current value stored for `T`.
    ///
    /// # Errors
    /// [`ContextError::NotInstalled`] when no slot for `T` exists. An
    /// installed but empty slot yields `Ok(None)`.
    pub fn get_value<T: Clone + Send + 'static>(&self) -> Result<Option<T>, ContextError> {
        Ok(self.require::<T>()?.get())
    }

    #[must_use]
    pub fn is_installed<T: Send + 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for RequestScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestScope")
            .field("slots", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct AccountTag(u32);

    #[derive(Debug, Clone, PartialEq)]
    struct Nonce(String);

    #[test]
    fn install_once_returns_same_slot() {
        let mut scope = RequestScope::new();
        let first = scope.install_once::<AccountTag>();
        let second = scope.install_once::<AccountTag>();
        assert!(Arc::ptr_eq(&first, &second));

        first.set(AccountTag(7));
        assert_eq!(second.get(), Some(AccountTag(7)));
    }

    #[test]
    fn install_once_keeps_existing_value() {
        let mut scope = RequestScope::new();
        scope.install_once::<AccountTag>().set(AccountTag(1));
        let again = scope.install_once::<AccountTag>();
        assert_eq!(again.get(), Some(AccountTag(1)));
    }

    #[test]
    fn slots_are_keyed_by_type() {
        let mut scope = RequestScope::new();
        scope.install_once::<AccountTag>().set(AccountTag(3));
        scope.install_once::<Nonce>().set(Nonce("n".to_owned()));

        assert_eq!(scope.get_value::<AccountTag>(), Ok(Some(AccountTag(3))));
        assert_eq!(scope.get_value::<Nonce>(), Ok(Some(Nonce("n".to_owned()))));
    }

    #[test]
    fn get_value_without_install_is_an_error() {
        let scope = RequestScope::new();
        let err = scope.get_value::<AccountTag>().unwrap_err();
        assert!(matches!(
            err,
            ContextError::NotInstalled { type_name } if type_name.ends_with("AccountTag")
        ));
    }

    #[test]
    fn installed_but_empty_is_none() {
        let mut scope = RequestScope::new();
        let _ = scope.install_once::<AccountTag>();
        assert_eq!(scope.get_value::<AccountTag>(), Ok(None));
    }

    #[test]
    fn take_empties_the_slot() {
        let mut scope = RequestScope::new();
        let slot = scope.install_once::<Nonce>();
        slot.set(Nonce("x".to_owned()));
        assert_eq!(slot.take(), Some(Nonce("x".to_owned())));
        assert!(!slot.is_set());
    }

    #[test]
    fn with_mut_updates_in_place() {
        let mut scope = RequestScope::new();
        let slot = scope.install_once::<Vec<u8>>();
        slot.set(vec![1]);
        slot.with_mut(|v| {
            if let Some(v) = v {
                v.push(2);
            }
        });
        assert_eq!(slot.get(), Some(vec![1, 2]));
        assert!(slot.with(|v| v.is_some_and(|v| v.len() == 2)));
    }

    #[test]
    fn scope_lives_in_request_extensions() {
        let mut req = http::Request::new(());
        RequestScope::of(req.extensions_mut())
            .install_once::<AccountTag>()
            .set(AccountTag(9));

        let scope = RequestScope::of(req.extensions_mut());
        assert_eq!(scope.get_value::<AccountTag>(), Ok(Some(AccountTag(9))));
    }
}
