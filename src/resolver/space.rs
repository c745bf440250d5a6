//! Registry of named containers that dotted paths are resolved against.
//!
//! A container plays the part of a module: it has a dotted name
//! (`"pets.views"`) and an initializer that populates its members. The
//! initializer runs the first time any member of the container is looked up,
//! not when the container is registered, so a route table can name views
//! whose containers are expensive to set up without paying for them until a
//! request actually arrives.

use super::error::ResolutionError;
use super::handler::Handler;
use crate::dispatcher::{Request, Response, RouteArgs};
use crate::view::View;
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

type InitFn = dyn Fn(&mut Members) -> anyhow::Result<()> + Send + Sync;

static GLOBAL: Lazy<Arc<SymbolSpace>> = Lazy::new(|| Arc::new(SymbolSpace::new()));

/// Members collected by a container initializer.
#[derive(Default)]
pub struct Members {
    entries: HashMap<String, Handler>,
}

impl Members {
    pub fn insert(&mut self, name: impl Into<String>, handler: Handler) -> &mut Self {
        self.entries.insert(name.into(), handler);
        self
    }

    pub fn callable<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(Request, RouteArgs) -> Response + Send + Sync + 'static,
    {
        self.insert(name, Handler::callable(f))
    }

    pub fn view<V>(&mut self, name: impl Into<String>) -> &mut Self
    where
        V: View + Default,
    {
        self.insert(name, Handler::view::<V>())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Container {
    init: Box<InitFn>,
    // Set once the initializer has succeeded. A failed run leaves it empty.
    loaded: OnceCell<()>,
    members: RwLock<HashMap<String, Handler>>,
}

impl Container {
    fn new(init: Box<InitFn>) -> Self {
        Self {
            init,
            loaded: OnceCell::new(),
            members: RwLock::new(HashMap::new()),
        }
    }

    fn ensure_loaded(&self, path: &str, name: &str) -> Result<(), ResolutionError> {
        self.loaded
            .get_or_try_init(|| {
                let mut collected = Members::default();
                (self.init)(&mut collected).map_err(|e| ResolutionError::InitFailed {
                    path: path.to_owned(),
                    container: name.to_owned(),
                    reason: format!("{e:#}"),
                })?;

                let count = collected.len();
                let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
                for (member, handler) in collected.entries {
                    // Members defined explicitly before the first load take precedence
                    members.entry(member).or_insert(handler);
                }
                info!(container = %name, members = count, "Container initialized");
                Ok::<_, ResolutionError>(())
            })
            .map(|_| ())
    }

    fn member(&self, name: &str) -> Option<Handler> {
        self.members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

/// The process's addressable symbol space.
///
/// Thread-safe; containers can be registered and members defined while
/// requests are being resolved.
#[derive(Default)]
pub struct SymbolSpace {
    containers: DashMap<String, Arc<Container>>,
}

impl SymbolSpace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide symbol space used by [`Resolver::global`](super::Resolver::global).
    #[must_use]
    pub fn global() -> Arc<SymbolSpace> {
        Arc::clone(&GLOBAL)
    }

    /// Register a container under a dotted name.
    ///
    /// `init` runs lazily, on the first lookup of one of the container's
    /// members. It runs at most once successfully; if it fails, the next
    /// lookup runs it again.
    ///
    /// Registering a name twice replaces the earlier container, including any
    /// members it had already loaded.
    pub fn register<F>(&self, container: impl Into<String>, init: F)
    where
        F: Fn(&mut Members) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let container = container.into();
        if self
            .containers
            .insert(container.clone(), Arc::new(Container::new(Box::new(init))))
            .is_some()
        {
            warn!(container = %container, "Replaced existing container");
        } else {
            debug!(container = %container, "Container registered");
        }
    }

    /// Add or replace a single member.
    ///
    /// Creates an empty container if none is registered under that name.
    /// This is how a symbol that previously failed to resolve gets fixed at
    /// runtime.
    pub fn define(&self, container: &str, member: impl Into<String>, handler: Handler) {
        let entry = Arc::clone(
            self.containers
                .entry(container.to_owned())
                .or_insert_with(|| Arc::new(Container::new(Box::new(|_| Ok(())))))
                .value(),
        );
        let member = member.into();
        debug!(container = %container, member = %member, "Member defined");
        entry
            .members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(member, handler);
    }

    #[must_use]
    pub fn contains(&self, container: &str) -> bool {
        self.containers.contains_key(container)
    }

    /// Whether the container's initializer has completed successfully.
    #[must_use]
    pub fn is_loaded(&self, container: &str) -> bool {
        self.containers
            .get(container)
            .is_some_and(|c| c.loaded.get().is_some())
    }

    /// Names of all registered containers, sorted.
    #[must_use]
    pub fn container_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.containers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub(crate) fn lookup(
        &self,
        path: &str,
        container: &str,
        member: &str,
    ) -> Result<Handler, ResolutionError> {
        // Clone the Arc so the shard guard is released before the initializer runs
        let entry = self
            .containers
            .get(container)
            .map(|c| Arc::clone(c.value()))
            .ok_or_else(|| ResolutionError::ContainerNotFound {
                path: path.to_owned(),
                container: container.to_owned(),
            })?;

        entry.ensure_loaded(path, container)?;

        entry
            .member(member)
            .ok_or_else(|| ResolutionError::MemberNotFound {
                path: path.to_owned(),
                container: container.to_owned(),
                member: member.to_owned(),
            })
    }
}
