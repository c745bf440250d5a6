use crate::demo;
use crate::dispatcher::{Request, Response};
use crate::logging;
use crate::resolver::Resolver;
use crate::router::{Manifest, RouteTable};
use crate::runtime_config::RuntimeConfig;
use crate::template::{MiniJinjaRenderer, TemplateRenderer};
use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use http::Method;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for lazyview
#[derive(Parser, Debug)]
#[command(name = "lazyview")]
#[command(about = "Inspect lazy route tables and dispatch requests through them", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "LAZYVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Route manifest (YAML or JSON); the demo routes when omitted
    #[arg(long, global = true)]
    pub manifest: Option<PathBuf>,

    /// Directory to load templates from; the demo templates when omitted
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,

    /// Log level: trace/debug/info/warn/error
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List routes and the handler each one references
    Routes {
        /// Resolve every reference and report failures
        #[arg(long, default_value_t = false)]
        resolve: bool,
    },
    /// Dispatch a single request and print the response
    Request {
        /// Request method, e.g. GET
        method: String,

        /// Request path, optionally with a query string
        path: String,

        /// Header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Execute the parsed command line.
///
/// # Errors
///
/// Returns an error if the configuration, manifest or templates cannot be
/// loaded, or if the request arguments are malformed.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let mut config = RuntimeConfig::load(cli.config.as_deref())?;
    if let Some(manifest) = cli.manifest {
        config.manifest = Some(manifest);
    }
    if let Some(templates) = cli.templates {
        config.template_dir = Some(templates);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    let _guard = logging::init_logging(&config.log_level)?;

    let table = build_table(&config)?;
    match cli.command {
        Commands::Routes { resolve } => {
            print_routes(&table, resolve);
            Ok(())
        }
        Commands::Request {
            method,
            path,
            headers,
            body,
        } => {
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid method '{method}'"))?;
            let mut request = Request::new(method, &path);
            for header in &headers {
                let (name, value) = parse_header(header)?;
                request = request.with_header(name, value);
            }
            if let Some(body) = body {
                request = request.with_body(body);
            }
            let response = table.dispatch(request);
            print_response(&response);
            Ok(())
        }
    }
}

/// Route table for `config`: the demo symbol space, the configured
/// templates and the configured (or demo) manifest.
pub fn build_table(config: &RuntimeConfig) -> anyhow::Result<RouteTable> {
    let resolver = Arc::new(Resolver::new(demo::symbol_space()));
    let renderer: Arc<dyn TemplateRenderer> = match &config.template_dir {
        Some(dir) => Arc::new(MiniJinjaRenderer::from_dir(dir)),
        None => Arc::new(demo::renderer()?),
    };
    let manifest = match &config.manifest {
        Some(path) => Manifest::load(path)?,
        None => demo::manifest(),
    };
    let mut table = RouteTable::new(resolver).with_renderer(renderer);
    manifest.apply(&mut table)?;
    info!(routes_count = table.routes().len(), "Route table ready");
    Ok(table)
}

/// Split `Name: value`.
pub fn parse_header(raw: &str) -> anyhow::Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header '{raw}' must look like 'Name: value'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("header '{raw}' has an empty name"));
    }
    Ok((name, value.trim()))
}

fn print_routes(table: &RouteTable, resolve: bool) {
    println!("[routes] count={}", table.routes().len());
    for route in table.routes() {
        let view = route.view();
        if resolve {
            match view.resolved() {
                Ok(handler) => println!("[route] {} -> {} ({})", route.pattern(), view.label(), handler.kind()),
                Err(err) => println!("[route] {} -> {} (unresolved: {err})", route.pattern(), view.label()),
            }
        } else {
            println!("[route] {} -> {}", route.pattern(), view.label());
        }
    }
}

fn print_response(response: &Response) {
    println!("HTTP {}", response.status);
    for (name, value) in &response.headers {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", response.body_text());
}
