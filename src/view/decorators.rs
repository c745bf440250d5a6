//! Decorators wrap a view's entry point.
//!
//! A decorator receives the invocation and a `next` continuation and decides
//! whether, and how, to call it. Decorators declared by a view are composed
//! outermost first, so `vec![a, b]` runs `a(b(get_response))`.

use super::error::ViewError;
use super::invocation::Invocation;
use crate::dispatcher::Response;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Continuation passed to a decorator.
pub type Next<'a> = &'a mut dyn FnMut(&mut Invocation) -> Result<Response, ViewError>;

pub trait Decorator: Send + Sync {
    fn wrap(&self, invocation: &mut Invocation, next: Next<'_>) -> Result<Response, ViewError>;
}

/// Compose `decorators` around `inner` and run the chain.
pub(crate) fn decorate(
    decorators: &[Arc<dyn Decorator>],
    invocation: &mut Invocation,
    inner: Next<'_>,
) -> Result<Response, ViewError> {
    match decorators.split_first() {
        None => inner(invocation),
        Some((outer, rest)) => outer.wrap(invocation, &mut |inv| decorate(rest, inv, &mut *inner)),
    }
}

/// Reject requests that lack a header, e.g. `authorization`.
#[derive(Debug, Clone)]
pub struct RequireHeader {
    header: String,
}

impl RequireHeader {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }
}

impl Decorator for RequireHeader {
    fn wrap(&self, invocation: &mut Invocation, next: Next<'_>) -> Result<Response, ViewError> {
        match invocation.request.get_header(&self.header) {
            Some(value) if !value.trim().is_empty() => next(invocation),
            _ => Err(ViewError::Unauthorized(format!(
                "missing {} header",
                self.header
            ))),
        }
    }
}

/// Add fixed headers to every successful response.
#[derive(Debug, Clone, Default)]
pub struct ResponseHeaders {
    headers: Vec<(String, String)>,
}

impl ResponseHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl Decorator for ResponseHeaders {
    fn wrap(&self, invocation: &mut Invocation, next: Next<'_>) -> Result<Response, ViewError> {
        let mut response = next(invocation)?;
        for (name, value) in &self.headers {
            response.set_header(name, value.clone());
        }
        Ok(response)
    }
}

/// Log how long the wrapped phases took.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timed;

impl Decorator for Timed {
    fn wrap(&self, invocation: &mut Invocation, next: Next<'_>) -> Result<Response, ViewError> {
        let start = Instant::now();
        let result = next(invocation);
        info!(
            request_id = %invocation.request.request_id,
            route = %invocation.route(),
            ok = result.is_ok(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "View phases timed"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Request, RouteArgs};
    use std::sync::Mutex;

    struct Trace {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Decorator for Trace {
        fn wrap(&self, inv: &mut Invocation, next: Next<'_>) -> Result<Response, ViewError> {
            self.log.lock().unwrap().push(format!("{} before", self.label));
            let result = next(inv);
            self.log.lock().unwrap().push(format!("{} after", self.label));
            result
        }
    }

    #[test]
    fn test_first_declared_is_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let decorators: Vec<Arc<dyn Decorator>> = vec![
            Arc::new(Trace { label: "a", log: Arc::clone(&log) }),
            Arc::new(Trace { label: "b", log: Arc::clone(&log) }),
        ];
        let mut inv = Invocation::new(Request::get("/"), RouteArgs::new());
        let inner_log = Arc::clone(&log);
        let mut inner = |_: &mut Invocation| -> Result<Response, ViewError> {
            inner_log.lock().unwrap().push("inner".to_owned());
            Ok(Response::text(200, "ok"))
        };
        let resp = decorate(&decorators, &mut inv, &mut inner).expect("chain succeeds");
        assert_eq!(resp.status, 200);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a before", "b before", "inner", "b after", "a after"]
        );
    }

    #[test]
    fn test_require_header_short_circuits() {
        let mut called = false;
        let mut inner = |_: &mut Invocation| -> Result<Response, ViewError> {
            called = true;
            Ok(Response::text(200, "secret"))
        };
        let guard = RequireHeader::new("authorization");
        let mut inv = Invocation::new(Request::get("/"), RouteArgs::new());
        let err = guard.wrap(&mut inv, &mut inner).expect_err("no header");
        assert_eq!(err.status(), 401);
        assert!(!called);
    }

    #[test]
    fn test_response_headers_applied() {
        let deco = ResponseHeaders::new().with("cache-control", "no-store");
        let mut inv = Invocation::new(Request::get("/"), RouteArgs::new());
        let mut inner =
            |_: &mut Invocation| -> Result<Response, ViewError> { Ok(Response::text(200, "ok")) };
        let resp = deco.wrap(&mut inv, &mut inner).expect("ok");
        assert_eq!(resp.get_header("cache-control"), Some("no-store"));
    }
}
