//! Route table - maps URL patterns to dispatch wrappers.
//!
//! Patterns use `{name}` segments for named arguments and `{}` segments for
//! positional ones. Everything else matches literally. Matching ignores the
//! request method; method checks belong to the handler.

use super::error::RouteError;
use crate::dispatcher::{Collaborators, ErrorReporter, LazyView, Request, Response, RouteArgs};
use crate::resolver::{Resolver, RouteReference};
use crate::template::TemplateRenderer;
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One registered route.
pub struct Route {
    pattern: String,
    regex: Regex,
    /// One entry per capture group: `Some(name)` for `{name}`, `None` for `{}`
    slots: Vec<Option<Arc<str>>>,
    view: Arc<LazyView>,
}

impl Route {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn view(&self) -> &Arc<LazyView> {
        &self.view
    }

    fn extract(&self, path: &str) -> Option<RouteArgs> {
        let caps = self.regex.captures(path)?;
        let mut args = RouteArgs::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let value = caps.get(i + 1).map_or("", |m| m.as_str());
            match slot {
                Some(name) => args.named.push((Arc::clone(name), value.to_owned())),
                None => args.positional.push(value.to_owned()),
            }
        }
        Some(args)
    }
}

/// Ordered route table. The first matching pattern wins.
///
/// Every route shares the table's renderer and reporter.
pub struct RouteTable {
    resolver: Arc<Resolver>,
    collaborators: Arc<Collaborators>,
    routes: Vec<Route>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field(
                "routes",
                &self.routes.iter().map(Route::pattern).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            collaborators: Arc::new(Collaborators::default()),
            routes: Vec::new(),
        }
    }

    /// Renderer for every route, including those already registered.
    #[must_use]
    pub fn with_renderer(self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.collaborators.set_renderer(renderer);
        self
    }

    /// Reporter for every route, including those already registered.
    #[must_use]
    pub fn with_reporter(self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.collaborators.set_reporter(reporter);
        self
    }

    #[must_use]
    pub fn collaborators(&self) -> &Arc<Collaborators> {
        &self.collaborators
    }

    /// Register `reference` under `pattern` and return its dispatch wrapper.
    ///
    /// Nothing is resolved here; a dotted path is only looked up when the
    /// route first receives a request.
    pub fn route(
        &mut self,
        pattern: &str,
        reference: impl Into<RouteReference>,
    ) -> Result<Arc<LazyView>, RouteError> {
        let (regex, slots) = path_to_regex(pattern)?;
        let view = Arc::new(
            LazyView::new(reference.into(), Arc::clone(&self.resolver))
                .with_collaborators(Arc::clone(&self.collaborators)),
        );
        debug!(pattern = %pattern, view = %view.label(), "Route registered");
        self.routes.push(Route {
            pattern: pattern.to_owned(),
            regex,
            slots,
            view: Arc::clone(&view),
        });
        Ok(view)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    /// First route whose pattern matches `path`, with the extracted arguments.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&Route, RouteArgs)> {
        self.routes
            .iter()
            .find_map(|route| route.extract(path).map(|args| (route, args)))
    }

    /// Match the request path and hand the request to the route's wrapper.
    ///
    /// Returns 404 when no pattern matches.
    pub fn dispatch(&self, request: Request) -> Response {
        let start = Instant::now();
        match self.match_path(&request.path) {
            Some((route, args)) => {
                info!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    route_pattern = %route.pattern,
                    duration_us = start.elapsed().as_micros() as u64,
                    "Route matched"
                );
                route.view.handle(request, args)
            }
            None => {
                warn!(
                    request_id = %request.request_id,
                    method = %request.method,
                    path = %request.path,
                    "No route matched"
                );
                Response::error(404, &format!("no route for {}", request.path))
            }
        }
    }
}

/// Compile a route pattern into an anchored regex and its capture slots.
///
/// `/pets/{id}` becomes `^/pets/([^/]+)$` with slots `[Some("id")]`. A
/// trailing slash is kept, so `/pets/` matches `/pets/` and not `/pets`.
pub(crate) fn path_to_regex(pattern: &str) -> Result<(Regex, Vec<Option<Arc<str>>>), RouteError> {
    let invalid = |reason: &str| RouteError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: reason.to_owned(),
    };
    if !pattern.starts_with('/') {
        return Err(invalid("must start with '/'"));
    }

    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    let mut slots = Vec::with_capacity(pattern.matches('{').count());

    for segment in pattern.split('/').filter(|s| !s.is_empty()) {
        regex.push('/');
        if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if inner.contains(['{', '}']) {
                return Err(invalid("nested braces"));
            }
            regex.push_str("([^/]+)");
            slots.push(if inner.is_empty() {
                None
            } else {
                Some(Arc::from(inner))
            });
        } else if segment.contains(['{', '}']) {
            return Err(invalid("arguments must span a whole segment"));
        } else {
            regex.push_str(&regex::escape(segment));
        }
    }
    if regex.len() == 1 || pattern.ends_with('/') {
        regex.push('/');
    }
    regex.push('$');

    let compiled = Regex::new(&regex).map_err(|e| invalid(&e.to_string()))?;
    Ok((compiled, slots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_to_regex_named_and_positional() {
        let (re, slots) = path_to_regex("/pets/{id}/photos/{}").unwrap();
        assert_eq!(re.as_str(), "^/pets/([^/]+)/photos/([^/]+)$");
        assert_eq!(slots, vec![Some(Arc::<str>::from("id")), None]);
    }

    #[test]
    fn test_path_to_regex_root_and_literals() {
        let (re, slots) = path_to_regex("/").unwrap();
        assert!(re.is_match("/"));
        assert!(slots.is_empty());

        let (re, _) = path_to_regex("/v1.0/items").unwrap();
        assert!(re.is_match("/v1.0/items"));
        assert!(!re.is_match("/v1x0/items"));
    }

    #[test]
    fn test_path_to_regex_keeps_trailing_slash() {
        let (re, _) = path_to_regex("/pets/").unwrap();
        assert_eq!(re.as_str(), "^/pets/$");
        assert!(re.is_match("/pets/"));
        assert!(!re.is_match("/pets"));

        let (re, slots) = path_to_regex("/pets/{id}/").unwrap();
        assert!(re.is_match("/pets/7/"));
        assert!(!re.is_match("/pets/7"));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_path_to_regex_rejects_bad_patterns() {
        assert!(path_to_regex("pets").is_err());
        assert!(path_to_regex("/pets/id{x}").is_err());
        assert!(path_to_regex("/pets/{{x}}").is_err());
    }
}
