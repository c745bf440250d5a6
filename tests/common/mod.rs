#![allow(dead_code)]

use lazyview::dispatcher::{error_chain, ErrorReporter};
use lazyview::ids::RequestId;
use std::error::Error;
use std::sync::Mutex;

/// Captures every reported server error for assertions.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

#[derive(Debug, Clone)]
pub struct Report {
    pub request_id: RequestId,
    pub route: String,
    /// The error rendered with its source chain
    pub message: String,
}

impl RecordingReporter {
    pub fn reports(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().unwrap().len()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, request_id: RequestId, route: &str, error: &(dyn Error + 'static)) {
        self.reports.lock().unwrap().push(Report {
            request_id,
            route: route.to_owned(),
            message: error_chain(error),
        });
    }
}

pub mod test_tracing {
    use tracing::subscriber::DefaultGuard;

    /// Route this thread's events to the test output at debug level.
    pub fn init() -> DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}
