//! Template lookup and rendering.
//!
//! Views only see the [`TemplateRenderer`] trait. The default implementation
//! wraps a minijinja [`Environment`] that can be filled in memory or backed by
//! a template directory.

use crate::dispatcher::Request;
use crate::view::RenderContext;
use minijinja::{Environment, ErrorKind};
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

static EMPTY_RENDERER: Lazy<Arc<MiniJinjaRenderer>> = Lazy::new(|| Arc::new(MiniJinjaRenderer::new()));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// None of the candidate names is known to the renderer
    NotFound { names: Vec<String> },
    /// A template source failed to parse
    Syntax { template: String, reason: String },
    /// Rendering a template failed
    Render { template: String, reason: String },
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::NotFound { names } => {
                write!(f, "no template found among [{}]", names.join(", "))
            }
            TemplateError::Syntax { template, reason } => {
                write!(f, "template '{template}' failed to parse: {reason}")
            }
            TemplateError::Render { template, reason } => {
                write!(f, "template '{template}' failed to render: {reason}")
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Renders named templates with a view's context.
pub trait TemplateRenderer: Send + Sync {
    /// Whether `name` can be loaded.
    fn exists(&self, name: &str) -> bool;

    fn render(
        &self,
        name: &str,
        context: &RenderContext,
        request: &Request,
    ) -> Result<String, TemplateError>;
}

/// First name in `names` the renderer knows about.
pub fn select_template<'a>(
    renderer: &dyn TemplateRenderer,
    names: &'a [String],
) -> Result<&'a str, TemplateError> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| renderer.exists(name))
        .ok_or_else(|| TemplateError::NotFound {
            names: names.to_vec(),
        })
}

/// Shared renderer with no templates, used until a real one is configured.
pub(crate) fn empty_renderer() -> Arc<dyn TemplateRenderer> {
    Arc::<MiniJinjaRenderer>::clone(&EMPTY_RENDERER)
}

/// minijinja-backed renderer.
///
/// Templates see the view context as top-level variables. A `request` value
/// (`method`, `path`, `ajax`) is added unless the context already defines one.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Renderer with no templates.
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Renderer that loads templates from `dir` on first use.
    #[must_use]
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir.as_ref()));
        Self { env }
    }

    /// Register a template from source.
    pub fn add_template(
        &mut self,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        self.env
            .add_template_owned(name.clone(), source.into())
            .map_err(|e| TemplateError::Syntax {
                template: name,
                reason: e.to_string(),
            })
    }

    pub fn with_template(mut self, name: &str, source: &str) -> Result<Self, TemplateError> {
        self.add_template(name, source)?;
        Ok(self)
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn exists(&self, name: &str) -> bool {
        match self.env.get_template(name) {
            Ok(_) => true,
            // A template that exists but fails to parse is reported at render.
            Err(e) => e.kind() != ErrorKind::TemplateNotFound,
        }
    }

    fn render(
        &self,
        name: &str,
        context: &RenderContext,
        request: &Request,
    ) -> Result<String, TemplateError> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => TemplateError::NotFound {
                names: vec![name.to_owned()],
            },
            _ => TemplateError::Syntax {
                template: name.to_owned(),
                reason: e.to_string(),
            },
        })?;

        let mut vars = context.clone().into_map();
        if !vars.contains_key("request") {
            vars.insert(
                "request".to_owned(),
                json!({
                    "method": request.method.as_str(),
                    "path": request.path,
                    "ajax": request.is_ajax(),
                }),
            );
        }

        template
            .render(Value::Object(vars))
            .map_err(|e| TemplateError::Render {
                template: name.to_owned(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn renderer() -> MiniJinjaRenderer {
        MiniJinjaRenderer::new()
            .with_template("hello.html", "<h1>Hello {{ name }}!</h1>")
            .unwrap()
            .with_template("where.html", "{{ request.method }} {{ request.path }}")
            .unwrap()
    }

    #[test]
    fn test_render_context_values() {
        let ctx = RenderContext::new().with("name", "World");
        let out = renderer()
            .render("hello.html", &ctx, &Request::get("/"))
            .unwrap();
        assert_eq!(out, "<h1>Hello World!</h1>");
    }

    #[test]
    fn test_request_is_injected() {
        let out = renderer()
            .render("where.html", &RenderContext::new(), &Request::post("/pets?x=1"))
            .unwrap();
        assert_eq!(out, "POST /pets");
    }

    #[test]
    fn test_select_first_existing() {
        let r = renderer();
        let names = vec!["missing.html".to_owned(), "hello.html".to_owned()];
        assert_eq!(select_template(&r, &names).unwrap(), "hello.html");

        let none = vec!["a.html".to_owned()];
        assert_eq!(
            select_template(&r, &none),
            Err(TemplateError::NotFound {
                names: vec!["a.html".to_owned()]
            })
        );
    }

    #[test]
    fn test_syntax_error_on_add() {
        let mut r = MiniJinjaRenderer::new();
        let err = r.add_template("bad.html", "{% if %}").unwrap_err();
        assert!(matches!(err, TemplateError::Syntax { .. }));
    }

    #[test]
    fn test_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "page {{ n }}").unwrap();
        let r = MiniJinjaRenderer::from_dir(dir.path());
        assert!(r.exists("page.html"));
        assert!(!r.exists("other.html"));
        let ctx = RenderContext::new().with("n", 3);
        assert_eq!(r.render("page.html", &ctx, &Request::get("/")).unwrap(), "page 3");
    }
}
