//! Wrapping components so they run against a scoped view.
//!
//! [`scoped`] takes a component and a pattern list and returns a component:
//! at run time the wrapper builds a [`ScopedView`] over whatever store it
//! was handed and invokes the inner component with the view instead. The
//! pipeline context is forwarded untouched, and whatever the component
//! returns — success or failure — propagates verbatim. The adapter never
//! retries, never recovers, never inspects.
//!
//! A component can also be specified indirectly as a name plus
//! configuration ([`ScopedConfig`]); resolution goes through a
//! caller-supplied [`ComponentResolver`]. [`ComponentRegistry`] is the
//! bundled name-to-factory implementation for hosts that don't need a
//! richer loader.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ScopeError;
use crate::pattern::{MatchOptions, Scope};
use crate::store::KeyStore;
use crate::view::ScopedView;

/// A pipeline component: a unit of work over a key-value store.
///
/// `C` is the orchestration context the pipeline threads through every
/// component; this crate forwards it opaquely and never looks inside.
pub trait Component<V, C> {
    /// Name used when a scope violation is reported against this component.
    fn name(&self) -> &str {
        "component"
    }

    /// Do the work. The store may be the real namespace or any view over
    /// it; the component cannot tell and must not care.
    fn run(&self, store: &mut dyn KeyStore<V>, ctx: &mut C) -> Result<()>;
}

impl<V, C> Component<V, C> for Box<dyn Component<V, C>> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn run(&self, store: &mut dyn KeyStore<V>, ctx: &mut C) -> Result<()> {
        self.as_ref().run(store, ctx)
    }
}

/// A named component built from a plain function or closure.
pub struct FnComponent<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`Component`]. The name shows up in scope-violation
/// messages, so pick something a pipeline operator would recognize.
pub fn component_fn<F>(name: impl Into<String>, f: F) -> FnComponent<F> {
    FnComponent {
        name: name.into(),
        f,
    }
}

impl<V, C, F> Component<V, C> for FnComponent<F>
where
    F: Fn(&mut dyn KeyStore<V>, &mut C) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, store: &mut dyn KeyStore<V>, ctx: &mut C) -> Result<()> {
        (self.f)(store, ctx)
    }
}

/// A component wrapped with a scope. Itself a [`Component`], so wrapped and
/// unwrapped components are interchangeable in a pipeline — and scopes
/// compose by wrapping a `Scoped` in another `Scoped`.
pub struct Scoped<P> {
    component: P,
    scope: Scope,
}

/// Restrict `component` to the keys admitted by `patterns`.
///
/// The scope is compiled once here; a malformed pattern fails at wrap time,
/// not at run time.
pub fn scoped<P>(
    component: P,
    patterns: impl IntoIterator<Item = impl Into<String>>,
    options: MatchOptions,
) -> Result<Scoped<P>, ScopeError> {
    Ok(Scoped {
        component,
        scope: Scope::new(patterns, options)?,
    })
}

impl<P> Scoped<P> {
    /// The scope every invocation of this component runs under.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Unwrap, discarding the scope.
    pub fn into_inner(self) -> P {
        self.component
    }
}

impl<V, C, P> Component<V, C> for Scoped<P>
where
    P: Component<V, C>,
{
    fn name(&self) -> &str {
        self.component.name()
    }

    fn run(&self, store: &mut dyn KeyStore<V>, ctx: &mut C) -> Result<()> {
        debug!(
            component = self.component.name(),
            patterns = ?self.scope.patterns(),
            "invoking component under scope"
        );
        let mut view = ScopedView::for_component(store, &self.scope, self.component.name());
        self.component.run(&mut view, ctx)
    }
}

// ── Indirect construction: name + configuration ──

/// Declarative form of a scoped component, as it appears in pipeline
/// configuration: a single `name: args` pair, the pattern list, and the
/// matching options.
///
/// ```json
/// { "component": { "markdown": { "smartypants": true } },
///   "patterns": ["posts/**/*.md"],
///   "options": { "dot": true } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedConfig {
    /// Component name mapped to its configuration. Expected to hold exactly
    /// one entry; the first is taken.
    pub component: BTreeMap<String, serde_json::Value>,
    /// Glob patterns defining the scope.
    pub patterns: Vec<String>,
    /// Matching options; absent fields take their defaults.
    #[serde(default)]
    pub options: MatchOptions,
}

/// Resolves a component name and its configuration to an invocable
/// component. Supplied by the host; how names map to code is its concern.
pub trait ComponentResolver<V, C> {
    fn resolve(&self, name: &str, args: &serde_json::Value) -> Result<Box<dyn Component<V, C>>>;
}

type Factory<V, C> = Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Component<V, C>>>>;

/// Name-to-factory [`ComponentResolver`] for hosts without a richer loader.
pub struct ComponentRegistry<V, C> {
    factories: BTreeMap<String, Factory<V, C>>,
}

impl<V, C> ComponentRegistry<V, C> {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Register a factory under `name`. The factory receives the untyped
    /// configuration block from [`ScopedConfig`].
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Component<V, C>>> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }
}

impl<V, C> Default for ComponentRegistry<V, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, C> ComponentResolver<V, C> for ComponentRegistry<V, C> {
    fn resolve(&self, name: &str, args: &serde_json::Value) -> Result<Box<dyn Component<V, C>>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| anyhow!("unknown component '{name}'"))?;
        factory(args)
    }
}

/// Build a scoped component from its declarative form, resolving the
/// component name through `resolver`.
pub fn scoped_from_config<V, C>(
    config: &ScopedConfig,
    resolver: &dyn ComponentResolver<V, C>,
) -> Result<Scoped<Box<dyn Component<V, C>>>> {
    let (name, args) = config
        .component
        .iter()
        .next()
        .ok_or_else(|| anyhow!("component spec is empty"))?;
    let component = resolver.resolve(name, args)?;
    let scope = Scope::new(config.patterns.iter().cloned(), config.options)?;
    Ok(Scoped { component, scope })
}
