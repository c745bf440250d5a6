//! # CLI Module
//!
//! The `lazyview` binary: inspect a route table and push single requests
//! through it without a server.
//!
//! ## Commands
//!
//! ### `routes`
//!
//! List every route and the handler it references:
//!
//! ```bash
//! lazyview routes
//! lazyview --manifest routes.yaml routes --resolve
//! ```
//!
//! `--resolve` resolves each reference and reports the ones that fail.
//!
//! ### `request`
//!
//! Dispatch one request and print the response:
//!
//! ```bash
//! lazyview request GET /pets/1
//! lazyview request GET /pets -H 'X-Requested-With: XMLHttpRequest'
//! lazyview request POST /pets --body '{"name": "Bo"}'
//! ```
//!
//! ## Configuration
//!
//! `--config` (or `LAZYVIEW_CONFIG`) names a TOML file; see
//! [`runtime_config`](crate::runtime_config). Flags override the file and the
//! environment. Without a manifest the built-in [demo](crate::demo) routes
//! are served.

mod commands;


pub use commands::{build_table, parse_header, run_cli, Cli, Commands};
