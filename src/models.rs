// ABOUTME: Shared data models for schema-atlas
// ABOUTME: Reflected table metadata and the serialisable catalog summary tree

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a reflected relation is a base table or a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Table,
    View,
}

impl TableKind {
    /// Map an `information_schema.tables.table_type` value
    pub fn from_table_type(table_type: &str) -> Option<Self> {
        match table_type {
            "BASE TABLE" | "PARTITIONED TABLE" => Some(TableKind::Table),
            "VIEW" => Some(TableKind::View),
            _ => None,
        }
    }
}

/// A single reflected column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub position: i32,
    #[serde(rename = "dataType")]
    pub data_type: String,
    #[serde(rename = "udtName")]
    pub udt_name: String,
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(rename = "maxLength", default)]
    pub max_length: Option<i32>,
}

/// A foreign key from a table to another table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(rename = "referencedSchema")]
    pub referenced_schema: String,
    #[serde(rename = "referencedTable")]
    pub referenced_table: String,
    #[serde(rename = "referencedColumns")]
    pub referenced_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub name: String,
    pub columns: Vec<String>,
}

/// Reflected table metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    pub columns: Vec<Column>,
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Vec<String>,
    #[serde(rename = "uniqueConstraints", default)]
    pub unique_constraints: Vec<UniqueConstraint>,
    #[serde(rename = "foreignKeys", default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(schema: impl Into<String>, name: impl Into<String>, kind: TableKind) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            kind,
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Schema-qualified name, e.g. `public.orders`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_primary_key(&self, column: &str) -> bool {
        self.primary_key.iter().any(|c| c == column)
    }
}

/// Summary of one discovered schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSummary {
    pub name: String,
    pub tables: Vec<String>,
}

/// Summary of one registered engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSummary {
    pub name: String,
    #[serde(rename = "discoveredAt", default)]
    pub discovered_at: Option<DateTime<Utc>>,
    pub schemas: Vec<SchemaSummary>,
}

/// Engine → schema → table names, for reporting
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogSummary {
    pub engines: Vec<EngineSummary>,
}

impl CatalogSummary {
    pub fn table_count(&self) -> usize {
        self.engines
            .iter()
            .flat_map(|e| e.schemas.iter())
            .map(|s| s.tables.len())
            .sum()
    }

    /// Flatten to `engine.schema` → table names
    pub fn by_path(&self) -> BTreeMap<String, Vec<String>> {
        let mut out = BTreeMap::new();
        for engine in &self.engines {
            for schema in &engine.schemas {
                out.insert(
                    format!("{}.{}", engine.name, schema.name),
                    schema.tables.clone(),
                );
            }
        }
        out
    }
}

/// Server health as reported by `test-connection`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub connected: bool,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(rename = "serverVersion", default)]
    pub server_version: Option<String>,
}
