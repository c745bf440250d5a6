use crate::dispatcher::Response;
use crate::template::TemplateError;
use http::Method;
use std::fmt;

/// Failure raised by a view hook.
///
/// Caught once by the lifecycle and turned into a response; see
/// [`ViewError::into_response`] for the status mapping.
#[derive(Debug)]
pub enum ViewError {
    /// Request method is not in the view's allow-list
    MethodNotAllowed {
        method: Method,
        allowed: Vec<Method>,
    },
    /// Input failed validation
    BadRequest(String),
    /// A record the view looked up does not exist
    NotFound(String),
    /// Rejected by an authentication check
    Unauthorized(String),
    /// The view is missing something it needs, e.g. a template name
    ImproperlyConfigured(String),
    /// Template lookup or rendering failed
    Template(TemplateError),
    /// Anything else
    Internal(anyhow::Error),
}

impl ViewError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ViewError::NotFound(message.into())
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        ViewError::Internal(error.into())
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            ViewError::MethodNotAllowed { .. } => 405,
            ViewError::BadRequest(_) => 400,
            ViewError::NotFound(_) => 404,
            ViewError::Unauthorized(_) => 401,
            ViewError::ImproperlyConfigured(_) | ViewError::Template(_) | ViewError::Internal(_) => {
                500
            }
        }
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }

    /// Minimal diagnostic response for this error.
    ///
    /// Client errors carry their message; server errors carry a generic
    /// message only. 405 responses list the allowed methods in `Allow`.
    #[must_use]
    pub fn into_response(self) -> Response {
        let status = self.status();
        if self.is_server_error() {
            return Response::error(status, "internal server error");
        }
        let mut response = Response::error(status, &self.to_string());
        if let ViewError::MethodNotAllowed { allowed, .. } = &self {
            let allow = allowed
                .iter()
                .map(Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            response.set_header("allow", allow);
        }
        response
    }
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::MethodNotAllowed { method, .. } => {
                write!(f, "method {method} not allowed")
            }
            ViewError::BadRequest(msg) => write!(f, "bad request: {msg}"),
            ViewError::NotFound(msg) => write!(f, "not found: {msg}"),
            ViewError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            ViewError::ImproperlyConfigured(msg) => write!(f, "improperly configured: {msg}"),
            ViewError::Template(e) => write!(f, "template error: {e}"),
            ViewError::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Template(e) => Some(e),
            ViewError::Internal(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<TemplateError> for ViewError {
    fn from(e: TemplateError) -> Self {
        ViewError::Template(e)
    }
}

impl From<anyhow::Error> for ViewError {
    fn from(e: anyhow::Error) -> Self {
        ViewError::Internal(e)
    }
}
