//! Typed error model for scope mediation.
//!
//! Two layers, mirroring the read/write asymmetry of the view:
//!
//! - Reads never fail. An excluded key degrades to "absent" so a component
//!   written against an ordinary namespace cannot be made to crash merely
//!   because other entries exist outside its scope.
//! - Writes fail loudly. Silently dropping a write would corrupt data the
//!   caller believes it stored, so every out-of-scope mutation surfaces as
//!   [`ScopeError::OutOfScopeWrite`] carrying the offending key and the
//!   pattern set, distinguishable enough for a caller to branch on.
//!
//! Structural rule violations raised by the namespace itself (sealed store,
//! non-writable or non-removable entry) pass through the view unchanged via
//! `#[from]`.

use thiserror::Error;

/// The mutating operation a view rejected. Carried by
/// [`ScopeError::OutOfScopeWrite`] so the message names what was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Value reassignment (`set`).
    Set,
    /// Entry definition or attribute redefinition (`define` / `set_attrs`).
    Define,
    /// Key removal (`remove`).
    Delete,
}

impl std::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WriteOp::Set => "set",
            WriteOp::Define => "define",
            WriteOp::Delete => "delete",
        })
    }
}

/// Errors surfaced by scoped views and by scope construction.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// A mutation targeted a key outside the view's pattern set. The
    /// namespace is left untouched.
    #[error("{component} tried to {op} '{key}', out of scope {patterns:?}")]
    OutOfScopeWrite {
        /// Name of the component that attempted the write.
        component: String,
        /// Which mutating operation was attempted.
        op: WriteOp,
        /// The offending key.
        key: String,
        /// The pattern set the key failed against.
        patterns: Vec<String>,
    },

    /// The namespace's own structural rules rejected the operation.
    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    /// A pattern failed to compile when the scope was constructed.
    #[error("invalid scope pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern as supplied, including any `!` prefix.
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

impl ScopeError {
    /// True for scope violations, false for structural or construction
    /// failures.
    pub fn is_out_of_scope(&self) -> bool {
        matches!(self, ScopeError::OutOfScopeWrite { .. })
    }
}

/// Rule violations raised by the namespace itself, independent of any view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// The namespace is sealed and the key does not exist yet.
    #[error("cannot add '{key}': namespace is sealed")]
    Sealed { key: String },

    /// The entry exists but its value may not be reassigned.
    #[error("entry '{key}' is not writable")]
    NotWritable { key: String },

    /// The entry may not be deleted or have its attributes loosened.
    #[error("entry '{key}' is not removable")]
    NotRemovable { key: String },

    /// Attribute redefinition targeted a key the namespace does not own.
    #[error("no entry '{key}' to redefine")]
    UnknownKey { key: String },
}
