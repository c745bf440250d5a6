//! Built-in pet store used by the `lazyview` binary.
//!
//! Registers two containers on a [`SymbolSpace`]:
//!
//! | Path | Kind |
//! |---|---|
//! | `pets.views.PetList` | view, `GET` lists and `POST` creates |
//! | `pets.views.PetDetail` | view, `GET` only |
//! | `pets.views.Admin` | view behind [`RequireHeader`] |
//! | `pets.api.health` | callable |
//! | `pets.api.echo` | callable, returns its route arguments |

use crate::dispatcher::{Request, Response, RouteArgs};
use crate::resolver::SymbolSpace;
use crate::router::{Manifest, ManifestRoute};
use crate::template::{MiniJinjaRenderer, TemplateError};
use crate::view::{
    request_info, ContextProcessor, Decorator, Invocation, RenderContext, RequireHeader,
    ResponseHeaders, Timed, View, ViewError,
};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Pet {
    pub id: u64,
    pub name: &'static str,
    pub species: &'static str,
}

pub const PETS: &[Pet] = &[
    Pet { id: 1, name: "Rex", species: "dog" },
    Pet { id: 2, name: "Tom", species: "cat" },
    Pet { id: 3, name: "Nibbles", species: "hamster" },
    Pet { id: 4, name: "Luna", species: "cat" },
];

const TEMPLATES: &[(&str, &str)] = &[
    (
        "base.html",
        "<html><head><title>{% block title %}Pets{% endblock %}</title></head>\
         <body>{% block body %}{% endblock %}</body></html>",
    ),
    (
        "pets/list.html",
        "{% extends \"base.html\" %}{% block body %}<h1>Pets ({{ count }})</h1><ul>\
         {% for pet in pets %}<li>{{ pet.name }} ({{ pet.species }})</li>{% endfor %}\
         </ul>{% endblock %}",
    ),
    (
        "pets/rows.html",
        "{% for pet in pets %}<li>{{ pet.name }}</li>{% endfor %}",
    ),
    (
        "pets/detail.html",
        "{% extends \"base.html\" %}{% block title %}{{ pet.name }}{% endblock %}\
         {% block body %}<h1>{{ pet.name }}</h1><p>{{ pet.species }}</p>\
         <p>{{ request.path }}</p>{% endblock %}",
    ),
    ("admin.html", "<h1>Admin</h1><p>{{ user }}</p>"),
];

/// Lists pets, optionally filtered by `?species=`.
#[derive(Debug, Default)]
pub struct PetList;

impl View for PetList {
    fn name(&self) -> &'static str {
        "PetList"
    }

    fn template(&self) -> Option<&str> {
        Some("pets/list.html")
    }

    fn ajax_template(&self) -> Option<&str> {
        Some("pets/rows.html")
    }

    fn context_processors(&self) -> Vec<ContextProcessor> {
        vec![request_info]
    }

    fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        let species = inv.request.get_query_param("species");
        let pets: Vec<&Pet> = PETS
            .iter()
            .filter(|p| species.map_or(true, |s| p.species == s))
            .collect();
        let count = pets.len();
        inv.context.insert_serialized("pets", &pets)?;
        inv.context.insert("count", count);
        Ok(None)
    }

    fn post(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        let body = inv
            .request
            .body_json()
            .map_err(|e| ViewError::bad_request(format!("invalid JSON body: {e}")))?
            .ok_or_else(|| ViewError::bad_request("missing body"))?;
        let name = body
            .get("name")
            .and_then(Value::as_str)
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ViewError::bad_request("name is required"))?;
        let species = body.get("species").and_then(Value::as_str).unwrap_or("unknown");
        let id = PETS.len() as u64 + 1;
        Ok(Some(Response::json(
            201,
            json!({ "id": id, "name": name, "species": species }),
        )))
    }
}

/// One pet by `{id}`.
#[derive(Debug, Default)]
pub struct PetDetail {
    pet: Option<Pet>,
}

impl View for PetDetail {
    fn name(&self) -> &'static str {
        "PetDetail"
    }

    fn methods(&self) -> Vec<Method> {
        vec![Method::GET, Method::HEAD]
    }

    fn decorators(&self) -> Vec<Arc<dyn Decorator>> {
        vec![
            Arc::new(Timed),
            Arc::new(ResponseHeaders::new().with("cache-control", "max-age=60")),
        ]
    }

    fn template(&self) -> Option<&str> {
        Some("pets/detail.html")
    }

    fn get(&mut self, inv: &mut Invocation) -> Result<Option<Response>, ViewError> {
        let raw = inv.arg("id").unwrap_or_default();
        let id: u64 = raw
            .parse()
            .map_err(|_| ViewError::bad_request(format!("pet id must be a number, got '{raw}'")))?;
        let pet = PETS
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ViewError::not_found(format!("pet {id}")))?;
        self.pet = Some(*pet);
        Ok(None)
    }

    fn get_context_data(&mut self, inv: &mut Invocation) -> Result<RenderContext, ViewError> {
        let mut context = inv.context.clone();
        if let Some(pet) = &self.pet {
            context.insert_serialized("pet", pet)?;
        }
        Ok(context)
    }
}

/// Admin page. Requires an `authorization` header.
#[derive(Debug, Default)]
pub struct Admin;

impl View for Admin {
    fn name(&self) -> &'static str {
        "Admin"
    }

    fn methods(&self) -> Vec<Method> {
        vec![Method::GET]
    }

    fn decorators(&self) -> Vec<Arc<dyn Decorator>> {
        vec![Arc::new(RequireHeader::new("authorization"))]
    }

    fn template(&self) -> Option<&str> {
        Some("admin.html")
    }

    fn get_context_data(&mut self, inv: &mut Invocation) -> Result<RenderContext, ViewError> {
        let user = inv
            .request
            .get_header("authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("anonymous")
            .to_owned();
        Ok(RenderContext::new().with("user", user))
    }
}

fn health(_request: Request, _args: RouteArgs) -> Response {
    Response::json(200, json!({ "status": "ok" }))
}

fn echo(request: Request, args: RouteArgs) -> Response {
    let named: serde_json::Map<String, Value> = args
        .named
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Response::json(
        200,
        json!({
            "method": request.method.as_str(),
            "path": request.path,
            "positional": args.positional,
            "named": named,
        }),
    )
}

/// Register the `pets.views` and `pets.api` containers on `space`.
pub fn register(space: &SymbolSpace) {
    space.register("pets.views", |members| {
        members
            .view::<PetList>("PetList")
            .view::<PetDetail>("PetDetail")
            .view::<Admin>("Admin");
        Ok(())
    });
    space.register("pets.api", |members| {
        members.callable("health", health).callable("echo", echo);
        Ok(())
    });
}

/// A fresh symbol space holding only the demo containers.
#[must_use]
pub fn symbol_space() -> Arc<SymbolSpace> {
    let space = Arc::new(SymbolSpace::new());
    register(&space);
    space
}

/// In-memory renderer with the demo templates.
pub fn renderer() -> Result<MiniJinjaRenderer, TemplateError> {
    let mut renderer = MiniJinjaRenderer::new();
    for (name, source) in TEMPLATES {
        renderer.add_template(*name, *source)?;
    }
    Ok(renderer)
}

/// Routes served when no manifest is configured.
#[must_use]
pub fn manifest() -> Manifest {
    let routes = [
        ("/pets", "pets.views.PetList"),
        ("/pets/{id}", "pets.views.PetDetail"),
        ("/admin", "pets.views.Admin"),
        ("/health", "pets.api.health"),
        ("/echo/{}/{name}", "pets.api.echo"),
    ];
    Manifest {
        routes: routes
            .into_iter()
            .map(|(pattern, view)| ManifestRoute {
                pattern: pattern.to_owned(),
                view: view.to_owned(),
            })
            .collect(),
    }
}
