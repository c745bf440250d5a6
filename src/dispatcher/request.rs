use crate::ids::RequestId;
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Maximum inline route/query parameters before heap allocation
pub const MAX_INLINE_PARAMS: usize = 8;

/// Header storage shared by requests and responses.
///
/// Names are `Arc<str>` so repeated names (`content-type`, `allow`) clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Named parameter storage for query strings and named route arguments.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// An incoming request as seen by views.
///
/// Built by the hosting framework (or the CLI, or a test) and handed to
/// [`LazyView::handle`](super::LazyView::handle) by value.
#[derive(Debug, Clone)]
pub struct Request {
    /// Correlation id, taken from `x-request-id` when it carries a valid ULID
    pub request_id: RequestId,
    pub method: Method,
    /// Path without the query string
    pub path: String,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Build a request from a method and a path that may carry a query string.
    #[must_use]
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: if path.is_empty() { "/".to_owned() } else { path.to_owned() },
            query_params: query.map(parse_query).unwrap_or_default(),
            headers: HeaderVec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    #[must_use]
    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Add a header. Names are stored lowercase.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        if name == "x-request-id" {
            self.request_id = RequestId::from_header_or_new(Some(value.as_str()));
        }
        self.headers.push((Arc::from(name), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    ///
    /// Uses "last write wins" semantics: for `?limit=10&limit=20`, returns `20`.
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Note: This allocates - use get_query_param() in hot paths
    #[must_use]
    pub fn query_params_map(&self) -> HashMap<String, String> {
        self.query_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// True for requests sent with `X-Requested-With: XMLHttpRequest`.
    #[must_use]
    pub fn is_ajax(&self) -> bool {
        self.get_header("x-requested-with")
            .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    }

    /// Body as UTF-8 text, if there is a body and it is valid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        self.body
            .as_deref()
            .and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Parse the body as JSON. `Ok(None)` when there is no body.
    pub fn body_json(&self) -> Result<Option<Value>, serde_json::Error> {
        self.body
            .as_deref()
            .map(serde_json::from_slice::<Value>)
            .transpose()
    }
}

/// Parse `a=1&b=two` into a [`ParamVec`], URL-decoding names and values.
#[must_use]
pub fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(&*k), v.into_owned()))
        .collect()
}

/// Arguments the route pattern extracted from the URL.
///
/// `positional` holds anonymous `{}` captures in order; `named` holds
/// `{name}` captures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteArgs {
    pub positional: Vec<String>,
    pub named: ParamVec,
}

impl RouteArgs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_positional(mut self, value: impl Into<String>) -> Self {
        self.positional.push(value.into());
        self
    }

    #[must_use]
    pub fn with_named(mut self, name: &str, value: impl Into<String>) -> Self {
        self.named.push((Arc::from(name), value.into()));
        self
    }

    /// Named argument lookup.
    ///
    /// Uses "last write wins" semantics when a pattern repeats a name
    /// (`/org/{id}/user/{id}` yields the user id).
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.named
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_is_split_from_path() {
        let req = Request::get("/pets?limit=10&name=Rex%20Jr&limit=20");
        assert_eq!(req.path, "/pets");
        assert_eq!(req.get_query_param("limit"), Some("20"));
        assert_eq!(req.get_query_param("name"), Some("Rex Jr"));
        assert_eq!(req.get_query_param("missing"), None);
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let req = Request::get("/").with_header("X-Requested-With", "XMLHttpRequest");
        assert_eq!(req.get_header("x-requested-with"), Some("XMLHttpRequest"));
        assert!(req.is_ajax());
        assert!(!Request::get("/").is_ajax());
    }

    #[test]
    fn test_request_id_header_is_honoured() {
        let id = RequestId::new();
        let req = Request::get("/").with_header("x-request-id", id.to_string());
        assert_eq!(req.request_id, id);
    }

    #[test]
    fn test_body_json() {
        let req = Request::post("/pets").with_body(r#"{"name":"Rex"}"#);
        let body = req.body_json().expect("valid json").expect("has body");
        assert_eq!(body["name"], "Rex");
        assert!(Request::post("/pets").with_body("{").body_json().is_err());
        assert!(Request::get("/").body_json().expect("no body").is_none());
    }

    #[test]
    fn test_route_args_last_named_wins() {
        let args = RouteArgs::new()
            .with_named("id", "org-1")
            .with_named("id", "user-7")
            .with_positional("extra");
        assert_eq!(args.get("id"), Some("user-7"));
        assert_eq!(args.positional(0), Some("extra"));
        assert_eq!(args.positional(1), None);
    }
}
