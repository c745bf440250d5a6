//! # Dispatcher Module
//!
//! The dispatch wrapper registered for every route, plus the request and
//! response values that flow through it.
//!
//! ## Request Flow
//!
//! 1. The route table matches a path and extracts [`RouteArgs`]
//! 2. [`LazyView::handle`] resolves the route reference (first call only)
//! 3. Plain callables are invoked directly; view types are instantiated fresh
//!    and driven through the [view lifecycle](crate::view)
//! 4. Exactly one [`Response`] comes back
//!
//! ## Error Handling
//!
//! - Unresolvable references return 500 and are reported
//! - View errors are translated by the lifecycle (405, 400, 404, 401, 500)
//! - Panics are caught and return 500
//!
//! Every 5xx is passed to an [`ErrorReporter`] with the original error.

mod collaborators;
mod core;
mod report;
mod request;
mod response;

pub(crate) use self::core::panic_message;
pub use self::core::LazyView;
pub use collaborators::Collaborators;
pub(crate) use report::tracing_reporter;
pub use report::{error_chain, ErrorReporter, TracingReporter};
pub use request::{
    parse_query, HeaderVec, ParamVec, Request, RouteArgs, MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use response::{Body, Response};
