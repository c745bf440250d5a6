//! Tests for the dispatch wrapper
//!
//! # Test Coverage
//!
//! - Plain callables receive the request and arguments unchanged and their
//!   response is returned unchanged
//! - View types get a fresh instance per request
//! - Unresolvable references answer 500, name the path and are reported
//! - A reference fixed at runtime starts working without re-registration
//! - Panicking handlers answer 500
//! - Closure factories build views that need constructor arguments

mod common;

use common::{test_tracing, RecordingReporter};
use lazyview::dispatcher::{Body, ErrorReporter, LazyView, Request, Response, RouteArgs};
use lazyview::resolver::{Handler, ResolutionError, Resolver, RouteReference, SymbolSpace};
use lazyview::view::{FnFactory, Invocation, View, ViewError, ViewFactory};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn wrapper(space: &Arc<SymbolSpace>, path: &str, reporter: &Arc<RecordingReporter>) -> LazyView {
    LazyView::new(
        RouteReference::path(path),
        Arc::new(Resolver::new(Arc::clone(space))),
    )
    .with_reporter(Arc::clone(reporter) as Arc<dyn ErrorReporter>)
}

fn echo(request: Request, args: RouteArgs) -> Response {
    let mut resp = Response::json(
        418,
        json!({
            "method": request.method.as_str(),
            "path": request.path,
            "q": request.get_query_param("q"),
            "positional": args.positional,
            "id": args.get("id"),
        }),
    );
    resp.set_header("x-handled-by", "echo");
    resp
}

#[test]
fn test_callable_receives_args_and_response_is_unchanged() {
    let _tracing = test_tracing::init();
    let space = Arc::new(SymbolSpace::new());
    space.register("api", |m| {
        m.callable("echo", echo);
        Ok(())
    });
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "api.echo", &reporter);

    let args = RouteArgs::new().with_positional("first").with_named("id", "42");
    let resp = view.handle(Request::get("/things/first/42?q=blue"), args);

    assert_eq!(resp.status, 418);
    assert_eq!(resp.get_header("x-handled-by"), Some("echo"));
    assert_eq!(
        resp.body,
        Body::Json(json!({
            "method": "GET",
            "path": "/things/first/42",
            "q": "blue",
            "positional": ["first"],
            "id": "42",
        }))
    );
    assert_eq!(reporter.count(), 0);
}

static CREATED: AtomicUsize = AtomicUsize::new(0);

struct Counter {
    hits: usize,
}

impl Default for Counter {
    fn default() -> Self {
        CREATED.fetch_add(1, Ordering::SeqCst);
        Self { hits: 0 }
    }
}

impl View for Counter {
    fn get(&mut self, _inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        self.hits += 1;
        Ok(Some(Response::text(200, self.hits.to_string())))
    }
}

#[test]
fn test_view_is_instantiated_per_request() {
    let space = Arc::new(SymbolSpace::new());
    space.register("app.views", |m| {
        m.view::<Counter>("Counter");
        Ok(())
    });
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "app.views.Counter", &reporter);

    for _ in 0..3 {
        let resp = view.handle(Request::get("/count"), RouteArgs::new());
        assert_eq!(resp.body_text(), "1");
    }
    assert_eq!(CREATED.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unresolvable_reference_answers_500_and_is_reported() {
    let space = Arc::new(SymbolSpace::new());
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "missing.views.Gone", &reporter);

    let request = Request::get("/gone");
    let request_id = request.request_id;
    let resp = view.handle(request, RouteArgs::new());

    assert_eq!(resp.status, 500);
    assert!(resp.body_text().contains("missing.views.Gone"));
    assert!(!view.is_resolved());

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].request_id, request_id);
    assert_eq!(reports[0].route, "missing.views.Gone");
    assert!(reports[0].message.contains("missing.views.Gone"));
}

#[test]
fn test_try_handle_surfaces_resolution_error() {
    let space = Arc::new(SymbolSpace::new());
    space.register("app.views", |_m| Ok(()));
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "app.views.Nope", &reporter);

    let err = view.try_handle(Request::get("/"), RouteArgs::new()).unwrap_err();
    assert!(matches!(err, ResolutionError::MemberNotFound { .. }));
    assert_eq!(err.path(), "app.views.Nope");
    // try_handle leaves reporting to the caller
    assert_eq!(reporter.count(), 0);
}

#[test]
fn test_reference_fixed_at_runtime_starts_working() {
    let space = Arc::new(SymbolSpace::new());
    space.register("app.views", |_m| Ok(()));
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "app.views.late", &reporter);

    assert_eq!(view.handle(Request::get("/"), RouteArgs::new()).status, 500);

    space.define(
        "app.views",
        "late",
        Handler::callable(|_req, _args| Response::text(200, "here now")),
    );
    let resp = view.handle(Request::get("/"), RouteArgs::new());
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "here now");
    assert!(view.is_resolved());
    assert_eq!(reporter.count(), 1);
}

#[test]
fn test_direct_reference_needs_no_symbol_space() {
    let resolver = Arc::new(Resolver::new(Arc::new(SymbolSpace::new())));
    let view = LazyView::new(
        RouteReference::callable(|_req, args: RouteArgs| {
            Response::text(200, args.positional(0).unwrap_or("none").to_owned())
        }),
        resolver,
    );
    let resp = view.handle(Request::get("/"), RouteArgs::new().with_positional("x"));
    assert_eq!(resp.body_text(), "x");
}

#[test]
fn test_panicking_callable_answers_500() {
    let space = Arc::new(SymbolSpace::new());
    space.register("api", |m| {
        m.callable("boom", |_req, _args| -> Response { panic!("handler blew up") });
        Ok(())
    });
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "api.boom", &reporter);

    let resp = view.handle(Request::get("/boom"), RouteArgs::new());
    assert_eq!(resp.status, 500);
    assert!(!resp.body_text().contains("blew up"));

    let reports = reporter.reports();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].message.contains("handler blew up"));
}

struct Greeter {
    greeting: String,
    name: Option<String>,
}

impl View for Greeter {
    fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        self.name = inv.arg("name").map(str::to_owned);
        let name = self.name.as_deref().unwrap_or("stranger");
        Ok(Some(Response::text(200, format!("{} {name}", self.greeting))))
    }
}

#[test]
fn test_closure_factory_builds_configured_views() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let space = Arc::new(SymbolSpace::new());
    space.register("app.views", move |m| {
        let counter = Arc::clone(&counter);
        let factory = FnFactory::new("Greeter", move || -> Box<dyn View> {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Greeter {
                greeting: "hola".to_owned(),
                name: None,
            })
        });
        m.insert("Greeter", Handler::factory(factory));
        Ok(())
    });
    let reporter = Arc::new(RecordingReporter::default());
    let view = wrapper(&space, "app.views.Greeter", &reporter);

    let args = RouteArgs::new().with_named("name", "rex");
    assert_eq!(view.handle(Request::get("/"), args).body_text(), "hola rex");
    assert_eq!(view.handle(Request::get("/"), RouteArgs::new()).body_text(), "hola stranger");
    assert_eq!(built.load(Ordering::SeqCst), 2);

    let resolved = view.resolved().unwrap();
    assert_eq!(resolved.kind(), "view");
    let Handler::View(factory) = resolved else {
        panic!("expected a view handler");
    };
    assert_eq!(factory.view_name(), "Greeter");
}
