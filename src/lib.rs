//! keyscope — glob-scoped views over a shared key-value namespace.
//!
//! Pipelines thread one mutable [`Namespace`] through a sequence of
//! components. Wrapping a component with [`scoped`] restricts what it can
//! see and touch to the keys admitted by a glob pattern set, while keeping
//! the restriction invisible: the component receives something that
//! behaves exactly like a smaller namespace.
//!
//! The seam is the [`KeyStore`] trait. Components are written against
//! `&mut dyn KeyStore<V>`; both the real store and every [`ScopedView`]
//! over it implement the trait, so the adapter can substitute one for the
//! other without the component's cooperation.
//!
//! Reads through a view degrade gracefully — an out-of-scope key simply
//! reports absent. Writes fail loudly with
//! [`ScopeError::OutOfScopeWrite`], because silently dropping a write
//! would corrupt data the component believes it stored. Entries the store
//! has pinned down (non-removable, non-writable) stay visible through
//! every view regardless of scope; no two observers of the same store may
//! disagree about whether such a key exists.
//!
//! ## Quick start
//!
//! ```
//! use keyscope::{component_fn, scoped, Component, KeyStore, MatchOptions, Namespace};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut files: Namespace<String> = Namespace::new();
//! files.insert("posts/hello.md", "# hello".to_string())?;
//! files.insert("index.html", "<html>".to_string())?;
//!
//! let shout = component_fn(
//!     "shout",
//!     |files: &mut dyn KeyStore<String>, _: &mut ()| -> anyhow::Result<()> {
//!         assert!(files.get("index.html").is_none()); // out of scope
//!         for key in files.keys() {
//!             let body = files.get(&key).cloned().unwrap_or_default();
//!             files.set(&key, body.to_uppercase())?;
//!         }
//!         Ok(())
//!     },
//! );
//!
//! let mut ctx = ();
//! scoped(shout, ["posts/**"], MatchOptions::default())?.run(&mut files, &mut ctx)?;
//!
//! assert_eq!(files.get("posts/hello.md").map(String::as_str), Some("# HELLO"));
//! assert_eq!(files.get("index.html").map(String::as_str), Some("<html>"));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod errors;
pub mod namespace;
pub mod pattern;
pub mod store;
pub mod view;

pub use adapter::{
    component_fn, scoped, scoped_from_config, Component, ComponentRegistry, ComponentResolver,
    FnComponent, Scoped, ScopedConfig,
};
pub use errors::{NamespaceError, ScopeError, WriteOp};
pub use namespace::{EntryAttrs, Namespace};
pub use pattern::{MatchOptions, Scope};
pub use store::KeyStore;
pub use view::ScopedView;
