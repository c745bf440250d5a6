//! Resolver core - the cached path → handler lookup on every request.
//!
//! Cached lookups read an immutable snapshot through `ArcSwap` and take no
//! lock. Only the first resolution of a path goes through the per-path cell
//! in `pending`, which serializes concurrent first hits on the same path. The
//! cell is dropped once the handler is published or the attempt fails.

use super::error::ResolutionError;
use super::handler::{Handler, RouteReference};
use super::space::SymbolSpace;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

static GLOBAL: Lazy<Arc<Resolver>> = Lazy::new(|| Arc::new(Resolver::new(SymbolSpace::global())));

/// Turns [`RouteReference`]s into [`Handler`]s.
///
/// Successful resolutions are cached for the lifetime of the resolver and
/// are never evicted. Failures are not cached.
pub struct Resolver {
    space: Arc<SymbolSpace>,
    resolved: ArcSwap<HashMap<String, Handler>>,
    pending: DashMap<String, Arc<OnceCell<Handler>>>,
}

impl Resolver {
    #[must_use]
    pub fn new(space: Arc<SymbolSpace>) -> Self {
        Self {
            space,
            resolved: ArcSwap::from_pointee(HashMap::new()),
            pending: DashMap::new(),
        }
    }

    /// Process-wide resolver over [`SymbolSpace::global`].
    #[must_use]
    pub fn global() -> Arc<Resolver> {
        Arc::clone(&GLOBAL)
    }

    #[must_use]
    pub fn space(&self) -> &Arc<SymbolSpace> {
        &self.space
    }

    /// Resolve a route reference.
    ///
    /// Direct handlers are returned unchanged. Paths are resolved on first use
    /// and served from the cache afterwards.
    pub fn resolve(&self, reference: &RouteReference) -> Result<Handler, ResolutionError> {
        match reference {
            RouteReference::Direct(handler) => Ok(handler.clone()),
            RouteReference::Path(path) => self.resolve_path(path),
        }
    }

    pub fn resolve_path(&self, path: &str) -> Result<Handler, ResolutionError> {
        if let Some(handler) = self.resolved.load().get(path) {
            return Ok(handler.clone());
        }

        let (container, member) = split_path(path)?;
        let cell = Arc::clone(self.pending.entry(path.to_owned()).or_default().value());

        let outcome = cell
            .get_or_try_init(|| {
                let handler = self.space.lookup(path, container, member)?;
                info!(path = %path, kind = handler.kind(), "Route reference resolved");
                Ok::<_, ResolutionError>(handler)
            })
            .cloned();

        let handler = match outcome {
            Ok(handler) => handler,
            Err(e) => {
                warn!(path = %path, error = %e, "Route reference resolution failed");
                self.release(path, &cell);
                return Err(e);
            }
        };

        self.resolved.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.insert(path.to_owned(), handler.clone());
            next
        });
        // Published; later lookups hit the snapshot
        self.release(path, &cell);

        Ok(handler)
    }

    /// Drop the first-resolution cell for `path` unless another caller
    /// already replaced it.
    fn release(&self, path: &str, cell: &Arc<OnceCell<Handler>>) {
        self.pending.remove_if(path, |_, current| Arc::ptr_eq(current, cell));
    }

    /// Cached handler for a path, without attempting resolution.
    #[must_use]
    pub fn cached(&self, path: &str) -> Option<Handler> {
        self.resolved.load().get(path).cloned()
    }

    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.resolved.load().len()
    }
}

/// Split `"<container>.<member>"` at the last dot.
pub(crate) fn split_path(path: &str) -> Result<(&str, &str), ResolutionError> {
    let invalid = || ResolutionError::InvalidPath {
        path: path.to_owned(),
    };
    let (container, member) = path.rsplit_once('.').ok_or_else(invalid)?;
    if member.is_empty() || container.split('.').any(str::is_empty) {
        return Err(invalid());
    }
    Ok((container, member))
}
