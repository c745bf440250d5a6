//! Tests for route tables and manifests

mod common;

use common::RecordingReporter;
use lazyview::dispatcher::{Body, ErrorReporter, Request, Response, RouteArgs};
use lazyview::resolver::{Resolver, RouteReference, SymbolSpace};
use lazyview::router::{RouteError, RouteTable};
use lazyview::template::MiniJinjaRenderer;
use lazyview::view::{Invocation, View, ViewError};
use serde_json::json;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn args_json(_req: Request, args: RouteArgs) -> Response {
    let named: serde_json::Map<String, serde_json::Value> = args
        .named
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    Response::json(200, json!({ "positional": args.positional, "named": named }))
}

fn resolver() -> Arc<Resolver> {
    let space = Arc::new(SymbolSpace::new());
    space.register("zoo.api", |m| {
        m.callable("args", args_json)
            .callable("root", |_req, _args| Response::text(200, "root"))
            .callable("special", |_req, _args| Response::text(200, "special"));
        Ok(())
    });
    Arc::new(Resolver::new(space))
}

#[test]
fn test_named_and_positional_extraction() {
    let mut table = RouteTable::new(resolver());
    table.route("/zoo/{}/animals/{id}", "zoo.api.args").unwrap();

    let (route, args) = table.match_path("/zoo/reptiles/animals/7").unwrap();
    assert_eq!(route.pattern(), "/zoo/{}/animals/{id}");
    assert_eq!(args.positional, vec!["reptiles".to_owned()]);
    assert_eq!(args.get("id"), Some("7"));

    let resp = table.dispatch(Request::get("/zoo/reptiles/animals/7?verbose=1"));
    assert_eq!(
        resp.body,
        Body::Json(json!({ "positional": ["reptiles"], "named": { "id": "7" } }))
    );
}

#[test]
fn test_repeated_name_last_wins() {
    let mut table = RouteTable::new(resolver());
    table.route("/org/{id}/user/{id}", "zoo.api.args").unwrap();
    let (_, args) = table.match_path("/org/1/user/2").unwrap();
    assert_eq!(args.get("id"), Some("2"));
    assert_eq!(args.named.len(), 2);
}

#[test]
fn test_unknown_path_is_404() {
    let mut table = RouteTable::new(resolver());
    table.route("/", "zoo.api.root").unwrap();

    assert_eq!(table.dispatch(Request::get("/")).body_text(), "root");
    let resp = table.dispatch(Request::get("/nothing/here"));
    assert_eq!(resp.status, 404);
    assert_eq!(
        resp.body,
        Body::Json(json!({ "error": "no route for /nothing/here", "status": 404 }))
    );
}

#[test]
fn test_first_registered_match_wins() {
    let mut table = RouteTable::new(resolver());
    table.route("/animals/special", "zoo.api.special").unwrap();
    table.route("/animals/{id}", "zoo.api.args").unwrap();

    assert_eq!(table.dispatch(Request::get("/animals/special")).body_text(), "special");
    assert_eq!(table.dispatch(Request::get("/animals/3")).status, 200);
    assert!(table.match_path("/animals").is_none());
    assert!(table.match_path("/animals/3/extra").is_none());
}

#[test]
fn test_route_returns_the_registered_wrapper() {
    let mut table = RouteTable::new(resolver());
    let view = table.route("/", "zoo.api.root").unwrap();
    assert!(Arc::ptr_eq(&view, table.routes()[0].view()));
    assert!(!view.is_resolved());
    table.dispatch(Request::get("/"));
    assert!(view.is_resolved());
}

#[test]
fn test_direct_references_can_be_mixed_with_paths() {
    let mut table = RouteTable::new(resolver());
    table
        .route(
            "/inline",
            RouteReference::callable(|_req, _args| Response::text(200, "inline")),
        )
        .unwrap();
    assert_eq!(table.dispatch(Request::get("/inline")).body_text(), "inline");
}

#[test]
fn test_invalid_patterns_are_rejected() {
    let mut table = RouteTable::new(resolver());
    let err = table.route("no-slash", "zoo.api.root").unwrap_err();
    assert!(matches!(err, RouteError::InvalidPattern { .. }));
    assert!(table.route("/half{id}", "zoo.api.root").is_err());
    assert!(table.routes().is_empty());
}

#[test]
fn test_manifest_loading_is_lazy() {
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let space = Arc::new(SymbolSpace::new());
    space.register("shop.views", move |m| {
        counter.fetch_add(1, Ordering::SeqCst);
        m.callable("index", |_req, _args| Response::text(200, "shop"));
        Ok(())
    });

    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "routes:\n  - pattern: /shop\n    view: shop.views.index\n  - pattern: /typo\n    view: shop.views.indx"
    )
    .unwrap();

    let table = RouteTable::from_manifest(file.path(), Arc::new(Resolver::new(space))).unwrap();
    assert_eq!(table.routes().len(), 2);
    assert_eq!(inits.load(Ordering::SeqCst), 0);

    assert_eq!(table.dispatch(Request::get("/shop")).body_text(), "shop");
    let typo = table.dispatch(Request::get("/typo"));
    assert_eq!(typo.status, 500);
    assert!(typo.body_text().contains("shop.views.indx"));
    assert_eq!(inits.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_manifest_is_an_io_error() {
    let err = RouteTable::from_manifest("/definitely/not/here.yaml", resolver()).unwrap_err();
    assert!(matches!(err, RouteError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here.yaml"));
}

#[derive(Default)]
struct Page;

impl View for Page {
    fn template(&self) -> Option<&str> {
        Some("page.html")
    }

    fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        let title = inv.request.get_query_param("title").unwrap_or("untitled").to_owned();
        inv.context.insert("title", title);
        Ok(None)
    }
}

fn page_space() -> Arc<SymbolSpace> {
    let space = Arc::new(SymbolSpace::new());
    space.register("app.views", |m| {
        m.view::<Page>("Page");
        Ok(())
    });
    space
}

#[test]
fn test_manifest_table_renders_with_renderer_set_afterwards() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "routes:\n  - pattern: /page\n    view: app.views.Page").unwrap();

    let renderer = MiniJinjaRenderer::new()
        .with_template("page.html", "<h1>{{ title }}</h1>")
        .unwrap();
    let table = RouteTable::from_manifest(file.path(), Arc::new(Resolver::new(page_space())))
        .unwrap()
        .with_renderer(Arc::new(renderer));

    let resp = table.dispatch(Request::get("/page?title=Pets"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body_text(), "<h1>Pets</h1>");
}

#[test]
fn test_reporter_set_after_registration_receives_failures() {
    let mut table = RouteTable::new(Arc::new(Resolver::new(page_space())));
    let view = table.route("/page", "app.views.Page").unwrap();

    let reporter = Arc::new(RecordingReporter::default());
    let table = table.with_reporter(Arc::clone(&reporter) as Arc<dyn ErrorReporter>);
    assert!(Arc::ptr_eq(table.collaborators(), view.collaborators()));

    // No renderer knows page.html yet
    assert_eq!(table.dispatch(Request::get("/page")).status, 500);
    assert_eq!(reporter.count(), 1);
    assert_eq!(reporter.reports()[0].route, "app.views.Page");
}

#[test]
fn test_trailing_slash_is_significant() {
    let mut table = RouteTable::new(resolver());
    table.route("/animals/", "zoo.api.special").unwrap();

    assert_eq!(table.dispatch(Request::get("/animals/")).body_text(), "special");
    assert_eq!(table.dispatch(Request::get("/animals")).status, 404);
}
