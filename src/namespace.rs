//! The shared mutable key-value store and its per-entry attributes.
//!
//! A [`Namespace`] is created by the orchestrator before any component runs
//! and persists across every scoped invocation in a pipeline run. Entries
//! carry two attributes orthogonal to their value: `removable` (may the key
//! be deleted or have its attributes loosened) and `writable` (may the value
//! be reassigned). Absent explicit attributes, an entry is ordinary mutable.
//!
//! The structural rules enforced here — a sealed store rejects new keys, a
//! non-writable entry rejects reassignment, a non-removable entry rejects
//! deletion and loosening — exist independently of scoping. Views consult
//! them but never relax them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{NamespaceError, ScopeError};
use crate::store::KeyStore;

/// Per-entry attribute flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryAttrs {
    /// May the key be deleted or have its attributes loosened.
    pub removable: bool,
    /// May the value be reassigned.
    pub writable: bool,
}

impl Default for EntryAttrs {
    fn default() -> Self {
        Self {
            removable: true,
            writable: true,
        }
    }
}

impl EntryAttrs {
    /// Non-removable and non-writable: the entry can never change or vanish.
    pub fn frozen() -> Self {
        Self {
            removable: false,
            writable: false,
        }
    }

    /// True when neither deletion nor reassignment is permitted.
    pub fn is_frozen(&self) -> bool {
        !self.removable && !self.writable
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    attrs: EntryAttrs,
}

/// A mutable mapping from string keys to values, with per-entry attributes
/// and an optional seal against new keys.
///
/// Enumeration order is the map's sorted key order and is shared by every
/// view over the store.
#[derive(Debug, Clone)]
pub struct Namespace<V> {
    entries: BTreeMap<String, Entry<V>>,
    sealed: bool,
}

impl<V> Namespace<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Current value of `key`, if the store owns it.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key).map(|e| &e.value)
    }

    /// Mutable access to the payload of `key`. Payload mutation is not a
    /// reassignment, so `writable` does not apply.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Attributes of `key`, if the store owns it.
    pub fn attrs(&self, key: &str) -> Option<EntryAttrs> {
        self.entries.get(key).map(|e| e.attrs)
    }

    /// Every key the store owns, in enumeration order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), &e.value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forbid adding new keys. Existing entries stay mutable per their own
    /// attributes. Irreversible.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Assign `value` to `key`, creating the entry with default attributes
    /// if absent. Returns the previous value on overwrite.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: V,
    ) -> Result<Option<V>, NamespaceError> {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                if !entry.attrs.writable {
                    return Err(NamespaceError::NotWritable { key });
                }
                Ok(Some(std::mem::replace(&mut entry.value, value)))
            }
            None => {
                if self.sealed {
                    return Err(NamespaceError::Sealed { key });
                }
                self.entries.insert(
                    key,
                    Entry {
                        value,
                        attrs: EntryAttrs::default(),
                    },
                );
                Ok(None)
            }
        }
    }

    /// Define `key` with an explicit value and attributes, creating it if
    /// absent.
    ///
    /// On a non-removable entry the redefinition must not loosen anything:
    /// `removable` stays false, `writable` never goes back to true, and the
    /// value is only replaced while the entry is still writable.
    pub fn define(
        &mut self,
        key: impl Into<String>,
        value: V,
        attrs: EntryAttrs,
    ) -> Result<(), NamespaceError> {
        let key = key.into();
        match self.entries.get_mut(&key) {
            Some(entry) => {
                if !entry.attrs.removable {
                    if attrs.removable || (attrs.writable && !entry.attrs.writable) {
                        return Err(NamespaceError::NotRemovable { key });
                    }
                    if !entry.attrs.writable {
                        return Err(NamespaceError::NotWritable { key });
                    }
                }
                entry.value = value;
                entry.attrs = attrs;
                Ok(())
            }
            None => {
                if self.sealed {
                    return Err(NamespaceError::Sealed { key });
                }
                self.entries.insert(key, Entry { value, attrs });
                Ok(())
            }
        }
    }

    /// Redefine the attributes of an existing entry, leaving its value
    /// alone. Same loosening rules as [`Namespace::define`].
    pub fn set_attrs(&mut self, key: &str, attrs: EntryAttrs) -> Result<(), NamespaceError> {
        match self.entries.get_mut(key) {
            Some(entry) => {
                if !entry.attrs.removable
                    && (attrs.removable || (attrs.writable && !entry.attrs.writable))
                {
                    return Err(NamespaceError::NotRemovable {
                        key: key.to_string(),
                    });
                }
                entry.attrs = attrs;
                Ok(())
            }
            None => Err(NamespaceError::UnknownKey {
                key: key.to_string(),
            }),
        }
    }

    /// Remove `key`, returning its value. Absent keys are not an error.
    pub fn remove(&mut self, key: &str) -> Result<Option<V>, NamespaceError> {
        match self.entries.get(key) {
            Some(entry) if !entry.attrs.removable => Err(NamespaceError::NotRemovable {
                key: key.to_string(),
            }),
            Some(_) => Ok(self.entries.remove(key).map(|e| e.value)),
            None => Ok(None),
        }
    }
}

impl<V> Default for Namespace<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an unsealed namespace of ordinary mutable entries.
impl<K: Into<String>, V> FromIterator<(K, V)> for Namespace<V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut ns = Namespace::new();
        for (k, v) in iter {
            ns.entries.insert(
                k.into(),
                Entry {
                    value: v,
                    attrs: EntryAttrs::default(),
                },
            );
        }
        ns
    }
}

impl<V> KeyStore<V> for Namespace<V> {
    fn get(&self, key: &str) -> Option<&V> {
        Namespace::get(self, key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        Namespace::get_mut(self, key)
    }

    fn contains(&self, key: &str) -> bool {
        Namespace::contains(self, key)
    }

    fn attrs(&self, key: &str) -> Option<EntryAttrs> {
        Namespace::attrs(self, key)
    }

    fn keys(&self) -> Vec<String> {
        Namespace::keys(self)
    }

    fn is_sealed(&self) -> bool {
        Namespace::is_sealed(self)
    }

    fn set(&mut self, key: &str, value: V) -> Result<(), ScopeError> {
        self.insert(key, value).map(|_| ()).map_err(ScopeError::from)
    }

    fn define(&mut self, key: &str, value: V, attrs: EntryAttrs) -> Result<(), ScopeError> {
        Namespace::define(self, key, value, attrs).map_err(ScopeError::from)
    }

    fn set_attrs(&mut self, key: &str, attrs: EntryAttrs) -> Result<(), ScopeError> {
        Namespace::set_attrs(self, key, attrs).map_err(ScopeError::from)
    }

    fn remove(&mut self, key: &str) -> Result<Option<V>, ScopeError> {
        Namespace::remove(self, key).map_err(ScopeError::from)
    }
}
