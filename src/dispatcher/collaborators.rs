//! Renderer and error reporter shared by a group of dispatch wrappers.
//!
//! A route table hands one [`Collaborators`] to every wrapper it creates.
//! Replacing the renderer or reporter later is seen by all of them, including
//! routes registered before the change.

use super::report::{tracing_reporter, ErrorReporter};
use crate::template::{empty_renderer, TemplateRenderer};
use arc_swap::ArcSwap;
use std::sync::Arc;

pub struct Collaborators {
    renderer: ArcSwap<Arc<dyn TemplateRenderer>>,
    reporter: ArcSwap<Arc<dyn ErrorReporter>>,
}

impl Collaborators {
    #[must_use]
    pub fn new(renderer: Arc<dyn TemplateRenderer>, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            renderer: ArcSwap::from_pointee(renderer),
            reporter: ArcSwap::from_pointee(reporter),
        }
    }

    /// Current renderer.
    #[must_use]
    pub fn renderer(&self) -> Arc<dyn TemplateRenderer> {
        Arc::clone(&**self.renderer.load())
    }

    /// Current reporter.
    #[must_use]
    pub fn reporter(&self) -> Arc<dyn ErrorReporter> {
        Arc::clone(&**self.reporter.load())
    }

    pub fn set_renderer(&self, renderer: Arc<dyn TemplateRenderer>) {
        self.renderer.store(Arc::new(renderer));
    }

    pub fn set_reporter(&self, reporter: Arc<dyn ErrorReporter>) {
        self.reporter.store(Arc::new(reporter));
    }
}

/// An empty renderer and the tracing reporter.
impl Default for Collaborators {
    fn default() -> Self {
        Self::new(empty_renderer(), tracing_reporter())
    }
}
