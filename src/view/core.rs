use super::context::{ContextProcessor, RenderContext};
use super::decorators::Decorator;
use super::error::ViewError;
use super::invocation::Invocation;
use super::lifecycle::{self, Completed};
use crate::dispatcher::Response;
use crate::template::select_template;
use http::Method;
use std::marker::PhantomData;
use std::sync::Arc;

/// A lifecycle view.
///
/// Implementors override only the hooks they need. Each hook has a default,
/// and no hook's default depends on how another hook is overridden.
///
/// # Lifecycle hooks
///
/// | Phase | Hooks |
/// |---|---|
/// | METHOD_CHECK | [`methods`](View::methods), [`check_method`](View::check_method) |
/// | CONTEXT_BUILD | [`action`](View::action) (→ `get`/`post`/...), [`context_processors`](View::context_processors), [`get_context_data`](View::get_context_data), [`get_context`](View::get_context) |
/// | RENDER | [`template`](View::template), [`ajax_template`](View::ajax_template), [`get_template_names`](View::get_template_names), [`render`](View::render) |
/// | RESPONSE | [`make_response`](View::make_response) |
/// | ERROR | [`handle_error`](View::handle_error) |
///
/// [`dispatch`](View::dispatch) is the single entry point. Cross-cutting
/// behaviour goes in [`decorators`](View::decorators), which wrap that entry
/// point and are inherited by any view that does not override them.
///
/// # Example
///
/// ```rust
/// use lazyview::dispatcher::{Request, RouteArgs};
/// use lazyview::view::{Invocation, View, ViewError};
/// use lazyview::dispatcher::Response;
///
/// #[derive(Default)]
/// struct Hello;
///
/// impl View for Hello {
///     fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
///         let name = inv.arg("name").unwrap_or("world").to_owned();
///         Ok(Some(Response::text(200, format!("hello {name}"))))
///     }
/// }
///
/// let inv = Invocation::new(Request::get("/"), RouteArgs::new().with_named("name", "rex"));
/// let done = Hello.dispatch(inv);
/// assert_eq!(done.response.body_text(), "hello rex");
/// ```
pub trait View: Send + 'static {
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Allowed request methods.
    fn methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::POST]
    }

    /// Decorators around the entry point, outermost first.
    fn decorators(&self) -> Vec<Arc<dyn Decorator>> {
        Vec::new()
    }

    /// Context contributions merged before [`get_context_data`](View::get_context_data).
    fn context_processors(&self) -> Vec<ContextProcessor> {
        Vec::new()
    }

    fn template(&self) -> Option<&str> {
        None
    }

    /// Template used instead of [`template`](View::template) for ajax requests.
    fn ajax_template(&self) -> Option<&str> {
        None
    }

    fn check_method(&self, invocation: &Invocation) -> Result<(), ViewError> {
        let allowed = self.methods();
        if allowed.contains(&invocation.request.method) {
            Ok(())
        } else {
            Err(ViewError::MethodNotAllowed {
                method: invocation.request.method.clone(),
                allowed,
            })
        }
    }

    /// Route the request to the verb hook for its method.
    ///
    /// Returning `Some(response)` skips rendering.
    fn action(&mut self, invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        let method = invocation.request.method.clone();
        if method == Method::GET || method == Method::HEAD {
            self.get(invocation)
        } else if method == Method::POST {
            self.post(invocation)
        } else if method == Method::PUT {
            self.put(invocation)
        } else if method == Method::PATCH {
            self.patch(invocation)
        } else if method == Method::DELETE {
            self.delete(invocation)
        } else {
            Ok(None)
        }
    }

    fn get(&mut self, _invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        Ok(None)
    }

    fn post(&mut self, _invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        Ok(None)
    }

    fn put(&mut self, _invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        Ok(None)
    }

    fn patch(&mut self, _invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        Ok(None)
    }

    fn delete(&mut self, _invocation: &mut Invocation) -> Result<Option<Response>, ViewError> {
        Ok(None)
    }

    /// The view's own context data. Defaults to the invocation's scratch context.
    fn get_context_data(&mut self, invocation: &mut Invocation) -> Result<RenderContext, ViewError> {
        Ok(invocation.context.clone())
    }

    /// Processors in declared order, then [`get_context_data`](View::get_context_data); later keys win.
    fn get_context(&mut self, invocation: &mut Invocation) -> Result<RenderContext, ViewError> {
        let mut context = RenderContext::new();
        for processor in self.context_processors() {
            context.update(processor(invocation)?);
        }
        context.update(self.get_context_data(invocation)?);
        Ok(context)
    }

    fn get_template_names(&self, invocation: &Invocation) -> Vec<String> {
        if invocation.request.is_ajax() {
            if let Some(ajax) = self.ajax_template() {
                return vec![ajax.to_owned()];
            }
        }
        self.template()
            .map(|t| vec![t.to_owned()])
            .unwrap_or_default()
    }

    /// Render the first available template with the given context.
    fn render(&mut self, invocation: &mut Invocation, context: &RenderContext) -> Result<String, ViewError> {
        let names = self.get_template_names(invocation);
        if names.is_empty() {
            return Err(ViewError::ImproperlyConfigured(format!(
                "{} does not define a template to render to",
                self.name()
            )));
        }
        let renderer = invocation.renderer();
        let template = select_template(renderer, &names)?;
        Ok(renderer.render(template, context, &invocation.request)?)
    }

    fn make_response(&self, invocation: &Invocation, content: String) -> Response {
        let mut response = Response::html(invocation.status, content);
        for (name, value) in &invocation.headers {
            response.set_header(name, value.clone());
        }
        response
    }

    fn handle_error(&self, _invocation: &Invocation, error: ViewError) -> Response {
        error.into_response()
    }

    /// Entry point: run the full lifecycle for this instance.
    fn dispatch(&mut self, invocation: Invocation) -> Completed {
        lifecycle::drive(self, invocation)
    }
}

/// Creates a fresh view instance per request.
pub trait ViewFactory: Send + Sync {
    fn create(&self) -> Box<dyn View>;

    fn view_name(&self) -> &str;
}

/// Factory for a view type constructed through `Default`.
pub struct ViewType<V> {
    _marker: PhantomData<fn() -> V>,
}

impl<V: View + Default> ViewType<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<V: View + Default> Default for ViewType<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: View + Default> ViewFactory for ViewType<V> {
    fn create(&self) -> Box<dyn View> {
        Box::new(V::default())
    }

    fn view_name(&self) -> &str {
        std::any::type_name::<V>()
    }
}

/// Factory backed by a closure, for views that need constructor arguments.
pub struct FnFactory<F> {
    name: String,
    make: F,
}

impl<F> FnFactory<F>
where
    F: Fn() -> Box<dyn View> + Send + Sync,
{
    pub fn new(name: impl Into<String>, make: F) -> Self {
        Self {
            name: name.into(),
            make,
        }
    }
}

impl<F> ViewFactory for FnFactory<F>
where
    F: Fn() -> Box<dyn View> + Send + Sync,
{
    fn create(&self) -> Box<dyn View> {
        (self.make)()
    }

    fn view_name(&self) -> &str {
        &self.name
    }
}
