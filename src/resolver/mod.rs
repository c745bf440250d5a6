//! # Resolver Module
//!
//! Lazy symbol resolution for route references.
//!
//! A route can point at its view in two ways:
//!
//! - **Directly**, with a [`Handler`] value that is already in hand
//! - **By path**, with a dotted string such as `"pets.views.PetDetail"`
//!
//! Paths are split at the last dot into a container (`pets.views`) and a
//! member (`PetDetail`). Containers live in a [`SymbolSpace`] and are
//! initialized the first time one of their members is requested, so a
//! misconfigured route surfaces when it is hit rather than when the table is
//! built.
//!
//! ```rust
//! use lazyview::dispatcher::Response;
//! use lazyview::resolver::{Resolver, SymbolSpace};
//! use std::sync::Arc;
//!
//! let space = Arc::new(SymbolSpace::new());
//! space.register("app.views", |members| {
//!     members.callable("health", |_req, _args| Response::text(200, "ok"));
//!     Ok(())
//! });
//!
//! let resolver = Resolver::new(space);
//! let first = resolver.resolve_path("app.views.health").unwrap();
//! let again = resolver.resolve_path("app.views.health").unwrap();
//! assert!(first.same_as(&again));
//! ```

mod core;
mod error;
mod handler;
mod space;

pub use self::core::Resolver;
pub use error::ResolutionError;
pub use handler::{CallableFn, Handler, RouteReference};
pub use space::{Members, SymbolSpace};
