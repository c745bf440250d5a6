//! # View Module
//!
//! Class-style views driven through a fixed per-request lifecycle.
//!
//! A view type is registered once (through a [`ViewFactory`]) and a fresh
//! instance is created for every request. [`View::dispatch`] runs that
//! instance through [`lifecycle::drive`]:
//!
//! 1. **METHOD_CHECK** - reject methods outside [`View::methods`] with 405
//! 2. **CONTEXT_BUILD** - verb hook, then context processors and
//!    [`View::get_context_data`]
//! 3. **RENDER** - pick a template name and render it
//! 4. **RESPONSE** - wrap the rendered content
//!
//! Any failure along the way lands in **ERROR**, which produces exactly one
//! response through [`View::handle_error`].

mod context;
mod core;
mod decorators;
mod error;
mod invocation;
pub mod lifecycle;

pub use self::core::{FnFactory, View, ViewFactory, ViewType};
pub use context::{request_info, route_args, ContextProcessor, RenderContext};
pub use decorators::{Decorator, Next, RequireHeader, ResponseHeaders, Timed};
pub use error::ViewError;
pub use invocation::Invocation;
pub use lifecycle::{drive, Completed, Phase};
