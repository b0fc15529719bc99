// ABOUTME: Root registry of named engines with keyed and dotted lookup
// ABOUTME: Navigation runs engine -> schema -> table

mod catalog;
mod engine;
mod schema;

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use serde::Serialize;

pub use catalog::Catalog;
pub use engine::Engine;
pub use schema::Schema;

use crate::db::Introspector;
use crate::error::{ItemKind, RegistryError, Result};
use crate::models::{CatalogSummary, EngineSummary, SchemaSummary, Table};

/// Tracks engines by name.
///
/// Engines are reached with `registry.get("name")` (fallible) or
/// `registry["name"]` (panics when missing), and whole paths with
/// `registry.resolve("engine.schema.table")`.
#[derive(Debug)]
pub struct Registry {
    engines: Catalog<Engine>,
}

/// Anything `Registry::resolve` can land on
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Engine(&'a Engine),
    Schema(&'a Schema),
    Table(&'a Table),
}

/// Serialisable view of a resolved node
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeView {
    Engine(EngineSummary),
    Schema(SchemaSummary),
    Table(Table),
}

impl Node<'_> {
    pub fn kind(&self) -> ItemKind {
        match self {
            Node::Engine(_) => ItemKind::Engine,
            Node::Schema(_) => ItemKind::Schema,
            Node::Table(_) => ItemKind::Table,
        }
    }

    pub fn to_view(&self) -> NodeView {
        match self {
            Node::Engine(engine) => NodeView::Engine(engine.summary()),
            Node::Schema(schema) => NodeView::Schema(schema.summary()),
            Node::Table(table) => NodeView::Table((*table).clone()),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            engines: Catalog::new("Registry", "registry", ItemKind::Engine),
        }
    }

    pub fn engines(&self) -> &Catalog<Engine> {
        &self.engines
    }

    /// Register a connection handle under `engine_name`, or under its database name.
    ///
    /// Registering an existing name replaces that engine.
    pub fn register_engine(
        &mut self,
        client: Arc<dyn Introspector>,
        engine_name: Option<&str>,
    ) -> Result<&mut Engine> {
        let name = resolve_engine_name(engine_name, client.as_ref())?;
        if self.engines.contains(&name) {
            log::warn!("Replacing registered engine '{}'", name);
        }
        log::debug!("Registering engine '{}'", name);
        Ok(self
            .engines
            .insert(name.clone(), Engine::new(name, client)))
    }

    pub fn get(&self, engine: &str) -> Result<&Engine> {
        self.engines.get(engine)
    }

    pub fn get_mut(&mut self, engine: &str) -> Result<&mut Engine> {
        self.engines.get_mut(engine)
    }

    pub fn contains(&self, engine: &str) -> bool {
        self.engines.contains(engine)
    }

    /// Look up `engine`, `engine.schema` or `engine.schema.table`.
    ///
    /// The table segment keeps any further dots, so tables indexed under a
    /// qualified name (`engine.schema.other.table`) stay reachable.
    pub fn resolve(&self, path: &str) -> Result<Node<'_>> {
        let (engine_name, schema_name, table_name) = split_path(path)?;

        let engine = self.get(engine_name)?;
        let Some(schema_name) = schema_name else {
            return Ok(Node::Engine(engine));
        };

        let schema = engine.get(schema_name).map_err(|e| {
            if engine.discovered_at().is_none() {
                e.with_detail(format!("Engine '{}' has not been discovered.", engine_name))
            } else {
                e
            }
        })?;
        let Some(table_name) = table_name else {
            return Ok(Node::Schema(schema));
        };

        Ok(Node::Table(schema.get(table_name)?))
    }

    /// Run discovery on every registered engine
    pub async fn discover_all(&mut self) -> Result<()> {
        for engine in self.engines.values_mut() {
            engine.discover().await?;
        }
        Ok(())
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            engines: self.engines.values().map(Engine::summary).collect(),
        }
    }
}

/// Split a dotted path into engine, schema and table segments.
///
/// The table segment keeps any further dots. Empty segments are rejected.
pub fn split_path(path: &str) -> Result<(&str, Option<&str>, Option<&str>)> {
    let mut parts = path.splitn(3, '.');
    let engine_name = parts.next().unwrap_or_default();
    let schema_name = parts.next();
    let table_name = parts.next();

    let empty = |segment: Option<&str>| segment.is_some_and(str::is_empty);
    if engine_name.is_empty() || empty(schema_name) || empty(table_name) {
        return Err(RegistryError::InvalidPath(path.to_string()));
    }
    Ok((engine_name, schema_name, table_name))
}

/// An explicit non-empty name wins, then the handle's database name
pub fn resolve_engine_name(engine_name: Option<&str>, client: &dyn Introspector) -> Result<String> {
    match engine_name {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => client
            .database_name()
            .filter(|db| !db.is_empty())
            .map(str::to_string)
            .ok_or(RegistryError::EngineNameUnresolved),
    }
}

impl Index<&str> for Registry {
    type Output = Engine;

    fn index(&self, engine: &str) -> &Engine {
        &self.engines[engine]
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.engines, f)
    }
}
