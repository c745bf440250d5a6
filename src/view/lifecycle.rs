//! The per-request state machine.
//!
//! ```text
//! INIT ─► METHOD_CHECK ─► CONTEXT_BUILD ─► RENDER ─► RESPONSE
//!              │                │             │
//!              └────────────────┴─────────────┴────► ERROR
//! ```
//!
//! RESPONSE and ERROR are terminal. Exactly one of them is reached per
//! request. Decorators wrap CONTEXT_BUILD through RESPONSE.

use super::core::View;
use super::decorators::{decorate, Decorator};
use super::error::ViewError;
use super::invocation::Invocation;
use crate::dispatcher::{panic_message, Response};
use anyhow::anyhow;
use std::cell::Cell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info};

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    MethodCheck,
    ContextBuild,
    Render,
    Response,
    Error,
}

impl Phase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Response | Phase::Error)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::MethodCheck => "method_check",
            Phase::ContextBuild => "context_build",
            Phase::Render => "render",
            Phase::Response => "response",
            Phase::Error => "error",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one lifecycle run.
#[derive(Debug)]
pub struct Completed {
    /// Terminal phase: `Response` or `Error`
    pub phase: Phase,
    /// Phase that raised, when `phase` is `Error`
    pub failed_in: Option<Phase>,
    pub response: Response,
}

/// Drive a view instance through the lifecycle.
///
/// Any [`ViewError`] or panic from METHOD_CHECK, CONTEXT_BUILD or RENDER is
/// caught here and handed to [`View::handle_error`]. Server errors are also
/// passed, in full, to the invocation's error reporter.
pub fn drive<V: View + ?Sized>(view: &mut V, mut invocation: Invocation) -> Completed {
    let current = Cell::new(Phase::Init);
    debug!(
        request_id = %invocation.request.request_id,
        view = view.name(),
        method = %invocation.request.method,
        "View lifecycle start"
    );

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> Result<Response, ViewError> {
        current.set(Phase::MethodCheck);
        view.check_method(&invocation)?;

        // Decorators wrap CONTEXT_BUILD, so a decorator rejection fails there
        current.set(Phase::ContextBuild);
        let decorators: Vec<Arc<dyn Decorator>> = view.decorators();
        let mut get_response = |inv: &mut Invocation| respond(&mut *view, inv, &current);
        decorate(&decorators, &mut invocation, &mut get_response)
    }));

    let result = match outcome {
        Ok(result) => result,
        Err(payload) => Err(ViewError::Internal(anyhow!(
            "view {} panicked: {}",
            view.name(),
            panic_message(payload.as_ref())
        ))),
    };

    match result {
        Ok(response) => {
            debug!(
                request_id = %invocation.request.request_id,
                view = view.name(),
                status = response.status,
                "View lifecycle complete"
            );
            Completed {
                phase: Phase::Response,
                failed_in: None,
                response,
            }
        }
        Err(error) => fail(view, &invocation, error, current.get()),
    }
}

/// CONTEXT_BUILD → RENDER → RESPONSE.
fn respond<V: View + ?Sized>(
    view: &mut V,
    invocation: &mut Invocation,
    current: &Cell<Phase>,
) -> Result<Response, ViewError> {
    current.set(Phase::ContextBuild);
    if let Some(response) = view.action(invocation)? {
        current.set(Phase::Response);
        return Ok(response);
    }
    let context = view.get_context(invocation)?;

    current.set(Phase::Render);
    let content = view.render(invocation, &context)?;

    current.set(Phase::Response);
    Ok(view.make_response(invocation, content))
}

fn fail<V: View + ?Sized>(
    view: &mut V,
    invocation: &Invocation,
    error: ViewError,
    failed_in: Phase,
) -> Completed {
    let request_id = invocation.request.request_id;
    if error.is_server_error() {
        invocation
            .reporter()
            .report(request_id, invocation.route(), &error);
    } else {
        info!(
            request_id = %request_id,
            view = view.name(),
            phase = %failed_in,
            status = error.status(),
            error = %error,
            "View rejected request"
        );
    }
    Completed {
        phase: Phase::Error,
        failed_in: Some(failed_in),
        response: view.handle_error(invocation, error),
    }
}
