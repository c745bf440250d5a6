use super::request::HeaderVec;
use serde_json::Value;
use std::sync::Arc;

/// Response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Text(String),
    Json(Value),
}

/// The value every dispatch ends in: status, headers and body.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Body,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Rendered HTML with `content-type: text/html; charset=utf-8`
    #[must_use]
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::with_content_type(status, "text/html; charset=utf-8", Body::Text(body.into()))
    }

    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::with_content_type(status, "text/plain; charset=utf-8", Body::Text(body.into()))
    }

    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        Self::with_content_type(status, "application/json", Body::Json(body))
    }

    /// Minimal diagnostic body: `{"error": message, "status": status}`
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(
            status,
            serde_json::json!({ "error": message, "status": status }),
        )
    }

    fn with_content_type(status: u16, content_type: &str, body: Body) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_owned()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value.into()));
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body rendered as a string; JSON bodies are serialized compactly.
    #[must_use]
    pub fn body_text(&self) -> String {
        match &self.body {
            Body::Empty => String::new(),
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_shape() {
        let resp = Response::error(405, "method DELETE not allowed");
        assert_eq!(resp.status, 405);
        assert_eq!(resp.get_header("Content-Type"), Some("application/json"));
        let Body::Json(body) = &resp.body else {
            panic!("error bodies are json");
        };
        assert_eq!(body["error"], "method DELETE not allowed");
        assert_eq!(body["status"], 405);
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = Response::html(200, "<p>hi</p>");
        resp.set_header("Content-Type", "text/html");
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("content-type"), Some("text/html"));
        assert_eq!(resp.body_text(), "<p>hi</p>");
    }
}
