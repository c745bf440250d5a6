use crate::dispatcher::{Request, Response, RouteArgs};
use crate::view::{View, ViewFactory, ViewType};
use std::fmt;
use std::sync::Arc;

/// Signature of a plain, function-style view.
pub type CallableFn = dyn Fn(Request, RouteArgs) -> Response + Send + Sync;

/// A resolved handler: either a plain callable or a lifecycle view type.
///
/// Cloning is cheap and preserves identity; two clones compare equal under
/// [`Handler::same_as`].
#[derive(Clone)]
pub enum Handler {
    /// Invoked directly with the request and route arguments
    Callable(Arc<CallableFn>),
    /// Instantiated fresh for every request and driven through the view lifecycle
    View(Arc<dyn ViewFactory>),
}

impl Handler {
    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(Request, RouteArgs) -> Response + Send + Sync + 'static,
    {
        Handler::Callable(Arc::new(f))
    }

    /// Lifecycle handler for a view type constructed with `Default`.
    #[must_use]
    pub fn view<V>() -> Self
    where
        V: View + Default,
    {
        Handler::View(Arc::new(ViewType::<V>::new()))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: ViewFactory + 'static,
    {
        Handler::View(Arc::new(factory))
    }

    /// Identity comparison: true when both point at the same underlying handler.
    #[must_use]
    pub fn same_as(&self, other: &Handler) -> bool {
        match (self, other) {
            (Handler::Callable(a), Handler::Callable(b)) => Arc::ptr_eq(a, b),
            (Handler::View(a), Handler::View(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Callable(_) => "callable",
            Handler::View(_) => "view",
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handler::Callable(c) => f
                .debug_tuple("Callable")
                .field(&Arc::as_ptr(c).cast::<()>())
                .finish(),
            Handler::View(v) => f.debug_tuple("View").field(&v.view_name()).finish(),
        }
    }
}

/// What a route table entry points at.
///
/// Either a handler that is already in hand, or a dotted path such as
/// `"pets.views.PetDetail"` that is looked up the first time the route is hit.
#[derive(Clone, Debug)]
pub enum RouteReference {
    Direct(Handler),
    Path(String),
}

impl RouteReference {
    pub fn path(path: impl Into<String>) -> Self {
        RouteReference::Path(path.into())
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(Request, RouteArgs) -> Response + Send + Sync + 'static,
    {
        RouteReference::Direct(Handler::callable(f))
    }

    #[must_use]
    pub fn view<V>() -> Self
    where
        V: View + Default,
    {
        RouteReference::Direct(Handler::view::<V>())
    }

    /// Human-readable label used in logs and error reports.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            RouteReference::Path(path) => path,
            RouteReference::Direct(Handler::Callable(_)) => "<callable>",
            RouteReference::Direct(Handler::View(v)) => v.view_name(),
        }
    }
}

impl From<&str> for RouteReference {
    fn from(path: &str) -> Self {
        RouteReference::Path(path.to_owned())
    }
}

impl From<String> for RouteReference {
    fn from(path: String) -> Self {
        RouteReference::Path(path)
    }
}

impl From<Handler> for RouteReference {
    fn from(handler: Handler) -> Self {
        RouteReference::Direct(handler)
    }
}
