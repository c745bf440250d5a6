//! Dispatcher core module - the per-route entry point.
//!
//! A [`LazyView`] is created once per route when the table is built. It owns
//! the route reference and a slot that is filled on the first successful
//! resolution; after that, every call reads the slot without locking.

use super::collaborators::Collaborators;
use super::report::ErrorReporter;
use super::request::{Request, RouteArgs};
use super::response::Response;
use crate::resolver::{CallableFn, Handler, ResolutionError, Resolver, RouteReference};
use crate::template::TemplateRenderer;
use crate::view::{Invocation, ViewFactory};
use anyhow::anyhow;
use once_cell::sync::OnceCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Registered entry for one route.
///
/// `handle` is the single calling convention the host uses for every route,
/// whatever kind of handler the reference points at:
///
/// - plain callables are invoked with the request and arguments, and their
///   response is returned unchanged;
/// - view types are instantiated fresh for the call and driven through the
///   view lifecycle.
pub struct LazyView {
    reference: RouteReference,
    label: Arc<str>,
    slot: OnceCell<Handler>,
    resolver: Arc<Resolver>,
    collaborators: Arc<Collaborators>,
}

impl std::fmt::Debug for LazyView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyView")
            .field("reference", &self.reference)
            .field("slot", &self.slot.get())
            .finish_non_exhaustive()
    }
}

impl LazyView {
    #[must_use]
    pub fn new(reference: RouteReference, resolver: Arc<Resolver>) -> Self {
        let label = Arc::from(reference.label());
        Self {
            reference,
            label,
            slot: OnceCell::new(),
            resolver,
            collaborators: Arc::new(Collaborators::default()),
        }
    }

    /// Use `renderer` for this wrapper only.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.collaborators = Arc::new(Collaborators::new(renderer, self.collaborators.reporter()));
        self
    }

    /// Use `reporter` for this wrapper only.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.collaborators = Arc::new(Collaborators::new(self.collaborators.renderer(), reporter));
        self
    }

    /// Share a renderer and reporter with other wrappers, e.g. those of one route table.
    #[must_use]
    pub fn with_collaborators(mut self, collaborators: Arc<Collaborators>) -> Self {
        self.collaborators = collaborators;
        self
    }

    #[must_use]
    pub fn collaborators(&self) -> &Arc<Collaborators> {
        &self.collaborators
    }

    #[must_use]
    pub fn reference(&self) -> &RouteReference {
        &self.reference
    }

    /// Path or view name used in logs and error reports.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the reference has been resolved yet.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    /// The resolved handler, resolving on first use.
    ///
    /// A failed resolution leaves the slot empty so the next call retries.
    pub fn resolved(&self) -> Result<&Handler, ResolutionError> {
        self.slot
            .get_or_try_init(|| self.resolver.resolve(&self.reference))
    }

    /// Dispatch a request, surfacing resolution failures to the caller.
    pub fn try_handle(&self, request: Request, args: RouteArgs) -> Result<Response, ResolutionError> {
        let handler = self.resolved()?;
        let request_id = request.request_id;
        let start = Instant::now();

        // Last-resort guard: the view lifecycle catches its own failures, this
        // covers plain callables and error hooks that panic.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match handler {
            Handler::Callable(f) => self.call_plain(f.as_ref(), request, args),
            Handler::View(factory) => self.call_view(factory.as_ref(), request, args),
        }));

        let response = match outcome {
            Ok(response) => response,
            Err(payload) => {
                let error = anyhow!("handler panicked: {}", panic_message(payload.as_ref()));
                self.collaborators
                    .reporter()
                    .report(request_id, &self.label, &*error);
                Response::error(500, "internal server error")
            }
        };

        debug!(
            request_id = %request_id,
            route = %self.label,
            status = response.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Dispatch complete"
        );
        Ok(response)
    }

    /// Dispatch a request. Always returns a response.
    ///
    /// Resolution failures are reported and answered with a 500 whose body
    /// names the unresolved path.
    pub fn handle(&self, request: Request, args: RouteArgs) -> Response {
        let request_id = request.request_id;
        match self.try_handle(request, args) {
            Ok(response) => response,
            Err(err) => {
                self.collaborators
                    .reporter()
                    .report(request_id, &self.label, &err);
                Response::error(500, &format!("unresolved view '{}'", err.path()))
            }
        }
    }

    fn call_plain(&self, f: &CallableFn, request: Request, args: RouteArgs) -> Response {
        f(request, args)
    }

    fn call_view(&self, factory: &dyn ViewFactory, request: Request, args: RouteArgs) -> Response {
        let mut view = factory.create();
        info!(
            request_id = %request.request_id,
            route = %self.label,
            view = factory.view_name(),
            method = %request.method,
            "View instantiated"
        );
        let invocation = Invocation::new(request, args)
            .with_route(Arc::clone(&self.label))
            .with_renderer(self.collaborators.renderer())
            .with_reporter(self.collaborators.reporter());
        view.dispatch(invocation).response
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
