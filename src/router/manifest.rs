//! Route manifests.
//!
//! ```yaml
//! routes:
//!   - pattern: /pets
//!     view: pets.views.PetList
//!   - pattern: /pets/{id}
//!     view: pets.views.PetDetail
//! ```
//!
//! Files ending in `.yaml` or `.yml` are read as YAML, anything else as JSON.

use super::core::RouteTable;
use super::error::RouteError;
use crate::resolver::Resolver;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRoute {
    pub pattern: String,
    /// Dotted path of the handler
    pub view: String,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RouteError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| RouteError::Io {
            path: display.clone(),
            source,
        })?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml" | "yml")
        );
        let parsed = if is_yaml {
            serde_yaml::from_str::<Manifest>(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Manifest>(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|reason| RouteError::Manifest {
            path: display,
            reason,
        })
    }

    /// Register every route on `table`, in manifest order.
    pub fn apply(&self, table: &mut RouteTable) -> Result<(), RouteError> {
        for route in &self.routes {
            table.route(&route.pattern, route.view.as_str())?;
        }
        Ok(())
    }
}

impl RouteTable {
    /// Build a table from a manifest file. No handler is resolved yet.
    pub fn from_manifest(path: impl AsRef<Path>, resolver: Arc<Resolver>) -> Result<Self, RouteError> {
        let manifest = Manifest::load(path.as_ref())?;
        let mut table = RouteTable::new(resolver);
        manifest.apply(&mut table)?;
        info!(
            manifest = %path.as_ref().display(),
            routes_count = table.routes().len(),
            "Route manifest loaded"
        );
        Ok(table)
    }
}
