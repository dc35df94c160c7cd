//! The mediating façade enforcing scope and attribute rules.
//!
//! A [`ScopedView`] borrows a store and a [`Scope`] for the duration of one
//! component invocation. It holds no state of its own — every operation
//! executes synchronously against the underlying store, so effects are
//! immediately visible to any other view over the same store.
//!
//! The two sides are deliberately asymmetric:
//!
//! - Reads lie gracefully. An out-of-scope key reports "absent", so a
//!   component written against a smaller namespace keeps working unchanged.
//! - Writes fail loudly with [`ScopeError::OutOfScopeWrite`]. Silently
//!   dropping a write would corrupt data the component believes it stored.
//!
//! Hiding is bounded by the store's own guarantees. A non-removable entry
//! can never appear to vanish: every view reports it present with its true
//! attributes, even when its key is out of scope, because two observers of
//! the same store must never disagree about whether such a key exists. The
//! value read gate is stricter: only a fully frozen entry (non-removable
//! and non-writable) has its value exposed through an out-of-scope read.
//! Likewise a sealed store's key set is a stronger promise than scoping,
//! so presence checks and enumeration bypass hiding entirely there —
//! value reads do not.

use tracing::{debug, trace};

use crate::errors::{ScopeError, WriteOp};
use crate::namespace::EntryAttrs;
use crate::pattern::Scope;
use crate::store::KeyStore;

/// A non-owning view over a store, restricted to the keys a [`Scope`]
/// admits. Implements [`KeyStore`], so it substitutes anywhere the store
/// itself was expected — including as the target of another view.
pub struct ScopedView<'a, V> {
    target: &'a mut (dyn KeyStore<V> + 'a),
    scope: &'a Scope,
    component: &'a str,
}

impl<'a, V> ScopedView<'a, V> {
    /// Wrap `target`, restricting it to the keys `scope` admits.
    pub fn new(target: &'a mut (dyn KeyStore<V> + 'a), scope: &'a Scope) -> Self {
        Self::for_component(target, scope, "component")
    }

    /// Like [`ScopedView::new`], labelling scope violations with the name
    /// of the component the view was built for.
    pub fn for_component(
        target: &'a mut (dyn KeyStore<V> + 'a),
        scope: &'a Scope,
        component: &'a str,
    ) -> Self {
        Self {
            target,
            scope,
            component,
        }
    }

    /// The scope this view enforces.
    pub fn scope(&self) -> &Scope {
        self.scope
    }

    /// Value reads hide an out-of-scope entry unless it is fully frozen,
    /// in which case the store guarantees its value can never change and
    /// every view must report it truthfully.
    fn value_read_gated(&self, key: &str) -> bool {
        if self.scope.is_match(key) {
            return false;
        }
        match self.target.attrs(key) {
            Some(attrs) => !attrs.is_frozen(),
            None => false,
        }
    }

    /// Presence checks hide an out-of-scope entry only while it is
    /// removable and the store still accepts new keys.
    fn presence_gated(&self, key: &str) -> bool {
        if self.scope.is_match(key) || self.target.is_sealed() {
            return false;
        }
        match self.target.attrs(key) {
            Some(attrs) => attrs.removable,
            None => false,
        }
    }

    fn out_of_scope(&self, op: WriteOp, key: &str) -> ScopeError {
        debug!(
            component = self.component,
            %op,
            key,
            patterns = ?self.scope.patterns(),
            "write rejected: key out of scope"
        );
        ScopeError::OutOfScopeWrite {
            component: self.component.to_string(),
            op,
            key: key.to_string(),
            patterns: self.scope.patterns().to_vec(),
        }
    }
}

impl<V> KeyStore<V> for ScopedView<'_, V> {
    fn get(&self, key: &str) -> Option<&V> {
        if self.value_read_gated(key) {
            trace!(component = self.component, key, "read gated by scope");
            return None;
        }
        self.target.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        if self.value_read_gated(key) {
            trace!(component = self.component, key, "read gated by scope");
            return None;
        }
        self.target.get_mut(key)
    }

    fn contains(&self, key: &str) -> bool {
        if self.presence_gated(key) {
            return false;
        }
        self.target.contains(key)
    }

    fn attrs(&self, key: &str) -> Option<EntryAttrs> {
        if self.presence_gated(key) {
            return None;
        }
        self.target.attrs(key)
    }

    fn keys(&self) -> Vec<String> {
        if self.target.is_sealed() {
            return self.target.keys();
        }
        self.target
            .keys()
            .into_iter()
            .filter(|key| {
                self.scope.is_match(key)
                    || self
                        .target
                        .attrs(key)
                        .is_some_and(|attrs| !attrs.removable)
            })
            .collect()
    }

    fn is_sealed(&self) -> bool {
        self.target.is_sealed()
    }

    fn set(&mut self, key: &str, value: V) -> Result<(), ScopeError> {
        if !self.scope.is_match(key) {
            return Err(self.out_of_scope(WriteOp::Set, key));
        }
        self.target.set(key, value)
    }

    fn define(&mut self, key: &str, value: V, attrs: EntryAttrs) -> Result<(), ScopeError> {
        if !self.scope.is_match(key) {
            return Err(self.out_of_scope(WriteOp::Define, key));
        }
        self.target.define(key, value, attrs)
    }

    fn set_attrs(&mut self, key: &str, attrs: EntryAttrs) -> Result<(), ScopeError> {
        if !self.scope.is_match(key) {
            return Err(self.out_of_scope(WriteOp::Define, key));
        }
        self.target.set_attrs(key, attrs)
    }

    fn remove(&mut self, key: &str) -> Result<Option<V>, ScopeError> {
        if !self.scope.is_match(key) {
            return Err(self.out_of_scope(WriteOp::Delete, key));
        }
        self.target.remove(key)
    }
}
