use super::context::RenderContext;
use crate::dispatcher::{tracing_reporter, ErrorReporter, HeaderVec, Request, RouteArgs};
use crate::template::{empty_renderer, TemplateRenderer};
use std::sync::Arc;

/// Per-request state of one view instance.
///
/// Created fresh for every request routed to a view and dropped when the
/// response has been produced. Hooks receive it by reference; it is never
/// shared between requests.
pub struct Invocation {
    pub request: Request,
    pub args: RouteArgs,
    /// Scratch context that verb hooks write into; returned by the default
    /// [`get_context_data`](super::View::get_context_data)
    pub context: RenderContext,
    /// Status used for the successful response
    pub status: u16,
    /// Extra headers for the successful response
    pub headers: HeaderVec,
    route: Arc<str>,
    renderer: Arc<dyn TemplateRenderer>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Invocation {
    /// INIT: store the request and route arguments, nothing else.
    ///
    /// Renders with the shared empty renderer and reports through tracing
    /// until [`with_renderer`](Self::with_renderer) and
    /// [`with_reporter`](Self::with_reporter) say otherwise.
    #[must_use]
    pub fn new(request: Request, args: RouteArgs) -> Self {
        Self {
            request,
            args,
            context: RenderContext::new(),
            status: 200,
            headers: HeaderVec::new(),
            route: Arc::from("<direct>"),
            renderer: empty_renderer(),
            reporter: tracing_reporter(),
        }
    }

    #[must_use]
    pub fn with_route(mut self, route: Arc<str>) -> Self {
        self.route = route;
        self
    }

    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Named route argument.
    #[must_use]
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args.get(name)
    }

    /// Label of the route this invocation was dispatched through.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    #[must_use]
    pub fn renderer(&self) -> &dyn TemplateRenderer {
        self.renderer.as_ref()
    }

    #[must_use]
    pub fn reporter(&self) -> &dyn ErrorReporter {
        self.reporter.as_ref()
    }

    /// Set a header on the successful response.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_collaborators_are_not_rebuilt_per_request() {
        let a = Invocation::new(Request::get("/a"), RouteArgs::new());
        let b = Invocation::new(Request::get("/b"), RouteArgs::new());
        assert!(Arc::ptr_eq(&a.renderer, &b.renderer));
        assert!(Arc::ptr_eq(&a.reporter, &b.reporter));
        assert_eq!(a.route(), "<direct>");
    }
}
