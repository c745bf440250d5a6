//! # Router Module
//!
//! Registers routes and finds the dispatch wrapper for a request path.
//!
//! Each call to [`RouteTable::route`] compiles the pattern into an anchored
//! regex and creates one [`LazyView`](crate::dispatcher::LazyView). Routes
//! can also be loaded from a YAML or JSON [`Manifest`].
//!
//! ## Example
//!
//! ```rust
//! use lazyview::dispatcher::{Request, Response};
//! use lazyview::resolver::{Resolver, SymbolSpace};
//! use lazyview::router::RouteTable;
//! use std::sync::Arc;
//!
//! let space = Arc::new(SymbolSpace::new());
//! space.register("app.api", |m| {
//!     m.callable("ping", |_req, args| Response::text(200, format!("pong {}", args.get("n").unwrap_or("-"))));
//!     Ok(())
//! });
//! let mut table = RouteTable::new(Arc::new(Resolver::new(space)));
//! table.route("/ping/{n}", "app.api.ping").unwrap();
//!
//! let resp = table.dispatch(Request::get("/ping/7"));
//! assert_eq!(resp.body_text(), "pong 7");
//! ```

mod core;
mod error;
mod manifest;

pub use self::core::{Route, RouteTable};
pub use error::RouteError;
pub use manifest::{Manifest, ManifestRoute};
