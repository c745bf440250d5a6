//! # lazyview
//!
//! **lazyview** is a routing and dispatch adapter: route tables name their
//! handlers by dotted path (`"pets.views.PetDetail"`) and nothing is looked
//! up until a route first receives a request.
//!
//! ## Overview
//!
//! Every route gets one dispatch wrapper, a [`LazyView`](dispatcher::LazyView),
//! with a single calling convention, `handle(request, args) -> Response`. On
//! first use it resolves the route's reference through a process-wide cache.
//! From then on it calls the resolved handler directly.
//!
//! Handlers come in two kinds:
//!
//! - **Plain callables** receive the request and the route arguments and
//!   return a response unchanged.
//! - **Lifecycle views** implement the [`View`](view::View) trait. A fresh
//!   instance is created for every request and driven through
//!   METHOD_CHECK, CONTEXT_BUILD, RENDER and RESPONSE, with failures
//!   translated into error responses in one place.
//!
//! ## Architecture
//!
//! - **[`resolver`]** - symbol space of lazily initialized containers and the
//!   resolution cache
//! - **[`dispatcher`]** - the per-route dispatch wrapper, request and response
//!   values, error reporting
//! - **[`view`]** - the `View` trait, its lifecycle, context and decorators
//! - **[`template`]** - template selection and minijinja rendering
//! - **[`router`]** - route tables and manifests
//! - **[`runtime_config`]** and **[`logging`]** - configuration and tracing setup
//! - **[`demo`]** and **[`cli`]** - the pet store served by the `lazyview` binary
//!
//! ## Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Table as RouteTable
//!     participant Wrapper as LazyView
//!     participant Resolver
//!     participant View
//!
//!     Host->>Table: dispatch(request)
//!     Table->>Table: match pattern, extract RouteArgs
//!     Table->>Wrapper: handle(request, args)
//!     alt first request on this route
//!         Wrapper->>Resolver: resolve("pets.views.PetDetail")
//!         Resolver->>Resolver: init container once, cache handler
//!         Resolver-->>Wrapper: Handler
//!     end
//!     Wrapper->>View: create() + dispatch(invocation)
//!     View-->>Wrapper: Completed { phase, response }
//!     Wrapper-->>Host: Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use lazyview::dispatcher::{Request, Response};
//! use lazyview::resolver::{Resolver, SymbolSpace};
//! use lazyview::router::RouteTable;
//! use lazyview::view::{Invocation, View, ViewError};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Greeting;
//!
//! impl View for Greeting {
//!     fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
//!         let who = inv.arg("who").unwrap_or("world");
//!         Ok(Some(Response::text(200, format!("hello {who}"))))
//!     }
//! }
//!
//! let space = Arc::new(SymbolSpace::new());
//! space.register("app.views", |m| {
//!     m.view::<Greeting>("Greeting");
//!     Ok(())
//! });
//!
//! let mut table = RouteTable::new(Arc::new(Resolver::new(space)));
//! let route = table.route("/hello/{who}", "app.views.Greeting").unwrap();
//! assert!(!route.is_resolved());
//!
//! let resp = table.dispatch(Request::get("/hello/rex"));
//! assert_eq!(resp.body_text(), "hello rex");
//! assert!(route.is_resolved());
//! ```

pub mod cli;
pub mod demo;
pub mod dispatcher;
pub mod ids;
pub mod logging;
pub mod resolver;
pub mod router;
pub mod runtime_config;
pub mod template;
pub mod view;

pub use dispatcher::{LazyView, Request, Response, RouteArgs};
pub use resolver::{Handler, ResolutionError, Resolver, RouteReference, SymbolSpace};
pub use router::RouteTable;
pub use view::{Invocation, View, ViewError};
