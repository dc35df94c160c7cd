//! The namespace operation surface.
//!
//! [`KeyStore`] is the minimal contract of a mutable key-value store:
//! existence check, value access, attribute query and redefinition, full
//! key enumeration, write, delete. Both [`Namespace`](crate::Namespace) and
//! [`ScopedView`](crate::ScopedView) implement it, and components are
//! written against `&mut dyn KeyStore<V>` — which is why a component cannot
//! tell a scoped view apart from the real store, and why views nest.

use crate::errors::ScopeError;
use crate::namespace::EntryAttrs;

/// Operation surface shared by the real namespace and every view over it.
///
/// Read operations never fail; they report "absent" instead. Write
/// operations fail loudly, either because the key is out of the caller's
/// scope or because the store's own structural rules reject the change.
pub trait KeyStore<V> {
    /// Current value of `key`, or `None` if the store does not own it (or
    /// the caller may not see it).
    fn get(&self, key: &str) -> Option<&V>;

    /// Mutable access to the payload of `key`, same visibility as
    /// [`KeyStore::get`]. Mutating the payload in place is not a write to
    /// the store.
    fn get_mut(&mut self, key: &str) -> Option<&mut V>;

    /// Whether `key` is present.
    fn contains(&self, key: &str) -> bool;

    /// Attributes of `key`, or `None` if absent.
    fn attrs(&self, key: &str) -> Option<EntryAttrs>;

    /// Every visible key, in the store's enumeration order.
    fn keys(&self) -> Vec<String>;

    /// Whether the store rejects new keys.
    fn is_sealed(&self) -> bool;

    /// Assign `value` to `key`, creating the entry if absent.
    fn set(&mut self, key: &str, value: V) -> Result<(), ScopeError>;

    /// Define `key` with an explicit value and attributes.
    fn define(&mut self, key: &str, value: V, attrs: EntryAttrs) -> Result<(), ScopeError>;

    /// Redefine the attributes of an existing entry.
    fn set_attrs(&mut self, key: &str, attrs: EntryAttrs) -> Result<(), ScopeError>;

    /// Remove `key`, returning its value. Absent keys are not an error.
    fn remove(&mut self, key: &str) -> Result<Option<V>, ScopeError>;
}
