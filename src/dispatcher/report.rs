use crate::ids::RequestId;
use once_cell::sync::Lazy;
use std::error::Error;
use std::sync::Arc;
use tracing::error;

static DEFAULT_REPORTER: Lazy<Arc<TracingReporter>> = Lazy::new(|| Arc::new(TracingReporter));

/// Process-level sink for failures that end in a 5xx response.
///
/// The response only carries a minimal diagnostic body; the full error,
/// including its source chain, is handed to the reporter.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, request_id: RequestId, route: &str, error: &(dyn Error + 'static));
}

/// Default reporter: one `error!` event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, request_id: RequestId, route: &str, error: &(dyn Error + 'static)) {
        error!(
            request_id = %request_id,
            route = %route,
            error = %error_chain(error),
            "Request failed with server error"
        );
    }
}

/// The process-wide [`TracingReporter`].
pub(crate) fn tracing_reporter() -> Arc<dyn ErrorReporter> {
    Arc::<TracingReporter>::clone(&DEFAULT_REPORTER)
}

/// Render an error and its sources as `outer: inner: root`.
#[must_use]
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
