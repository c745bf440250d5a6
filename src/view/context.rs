use super::error::ViewError;
use super::invocation::Invocation;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Name → value mapping handed to the render step.
///
/// Keys are kept sorted, so merging and serialization are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext(Map<String, Value>);

/// A context contribution computed from the invocation.
///
/// Declared by a view through [`View::context_processors`](super::View::context_processors)
/// and merged in declaration order.
pub type ContextProcessor = fn(&Invocation) -> Result<RenderContext, ViewError>;

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert any serializable value.
    pub fn insert_serialized<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<&mut Self, ViewError> {
        let value = serde_json::to_value(value).map_err(|e| ViewError::Internal(e.into()))?;
        self.0.insert(key.into(), value);
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Merge `other` into `self`; on key collisions `other` wins.
    pub fn update(&mut self, other: RenderContext) {
        self.0.extend(other.0);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for RenderContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for RenderContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Exposes the request under `request`: method, path, query and ajax flag.
pub fn request_info(invocation: &Invocation) -> Result<RenderContext, ViewError> {
    let request = &invocation.request;
    Ok(RenderContext::new().with(
        "request",
        json!({
            "method": request.method.as_str(),
            "path": request.path,
            "query": request.query_params_map(),
            "ajax": request.is_ajax(),
        }),
    ))
}

/// Exposes the named route arguments under `args`.
pub fn route_args(invocation: &Invocation) -> Result<RenderContext, ViewError> {
    let args: Map<String, Value> = invocation
        .args
        .named
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
        .collect();
    Ok(RenderContext::new().with("args", args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{Request, RouteArgs};

    #[test]
    fn test_update_later_wins() {
        let mut base = RenderContext::new().with("title", "Pets").with("count", 1);
        base.update(RenderContext::new().with("count", 2).with("extra", true));
        assert_eq!(base.get("title"), Some(&json!("Pets")));
        assert_eq!(base.get("count"), Some(&json!(2)));
        assert_eq!(base.get("extra"), Some(&json!(true)));
        assert_eq!(base.len(), 3);
    }

    #[test]
    fn test_builtin_processors() {
        let inv = Invocation::new(
            Request::get("/pets/7?sort=name"),
            RouteArgs::new().with_named("id", "7"),
        );
        let req = request_info(&inv).expect("infallible");
        assert_eq!(req.get("request").map(|r| &r["path"]), Some(&json!("/pets/7")));
        assert_eq!(req.get("request").map(|r| &r["query"]["sort"]), Some(&json!("name")));
        let args = route_args(&inv).expect("infallible");
        assert_eq!(args.get("args"), Some(&json!({ "id": "7" })));
    }

    #[derive(Serialize)]
    struct Pet {
        name: &'static str,
    }

    #[test]
    fn test_insert_serialized() {
        let mut ctx = RenderContext::new();
        ctx.insert_serialized("pet", &Pet { name: "Rex" })
            .expect("serializable");
        assert_eq!(ctx.into_value(), json!({ "pet": { "name": "Rex" } }));
    }
}
