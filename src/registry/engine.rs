// ABOUTME: Engine wrapper pairing one connection handle with its schemata
// ABOUTME: Builds the schema listing query and drives table reflection per schema

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::default_exclusions;
use crate::db::{Introspector, ReflectOptions};
use crate::error::{ItemKind, Result};
use crate::models::EngineSummary;

use super::catalog::Catalog;
use super::schema::Schema;

pub struct Engine {
    client: Arc<dyn Introspector>,
    schemata: Catalog<Schema>,
    exclusions: Vec<String>,
    options: ReflectOptions,
    discovered_at: Option<DateTime<Utc>>,
}

impl Engine {
    pub(crate) fn new(name: impl Into<String>, client: Arc<dyn Introspector>) -> Self {
        Self {
            client,
            schemata: Catalog::new("Engine", name, ItemKind::Schema),
            exclusions: default_exclusions(),
            options: ReflectOptions::default(),
            discovered_at: None,
        }
    }

    pub fn name(&self) -> &str {
        self.schemata.name()
    }

    /// The connection handle this engine reflects through
    pub fn client(&self) -> &Arc<dyn Introspector> {
        &self.client
    }

    pub fn schemata(&self) -> &Catalog<Schema> {
        &self.schemata
    }

    pub fn get(&self, schema: &str) -> Result<&Schema> {
        self.schemata.get(schema)
    }

    pub fn get_mut(&mut self, schema: &str) -> Result<&mut Schema> {
        self.schemata.get_mut(schema)
    }

    pub fn contains(&self, schema: &str) -> bool {
        self.schemata.contains(schema)
    }

    /// Schema name patterns (PostgreSQL regexes) skipped by `discover`
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    pub fn set_exclusions(&mut self, patterns: Vec<String>) {
        self.exclusions = patterns;
    }

    pub fn reflect_options(&self) -> &ReflectOptions {
        &self.options
    }

    pub fn set_reflect_options(&mut self, options: ReflectOptions) {
        self.options = options;
    }

    pub fn discovered_at(&self) -> Option<DateTime<Utc>> {
        self.discovered_at
    }

    /// Register an empty schema, replacing any schema with the same name
    pub fn register_schema(&mut self, schema_name: &str) -> &mut Schema {
        let schema = Schema::new(schema_name, self.name());
        self.schemata.insert(schema_name.to_string(), schema)
    }

    /// Build the schema listing query and its positional parameters
    pub fn build_discover_query(&self) -> (String, Vec<String>) {
        let mut sql = String::from(
            "SELECT schema_name::text AS schema_name\nFROM information_schema.schemata",
        );

        if !self.exclusions.is_empty() {
            let predicates: Vec<String> = (1..=self.exclusions.len())
                .map(|i| format!("schema_name::text !~ ${}", i))
                .collect();
            sql.push_str("\nWHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        sql.push_str("\nORDER BY schema_name");

        (sql, self.exclusions.clone())
    }

    /// Probe the connection for schemata, then reflect the tables of each one
    pub async fn discover(&mut self) -> Result<()> {
        let (query, params) = self.build_discover_query();
        let names = self.client.list_schemata(&query, &params).await?;

        log::info!(
            "Engine '{}': discovered {} schemata",
            self.name(),
            names.len()
        );

        self.schemata.clear();
        let client = Arc::clone(&self.client);
        let options = self.options.clone();
        for name in names {
            let schema = self.register_schema(&name);
            schema.discover(client.as_ref(), &options).await?;
        }

        self.discovered_at = Some(Utc::now());
        log::info!(
            "Engine '{}': reflected {} tables",
            self.name(),
            self.table_count()
        );
        Ok(())
    }

    pub fn table_count(&self) -> usize {
        self.schemata.values().map(|s| s.tables().len()).sum()
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            name: self.name().to_string(),
            discovered_at: self.discovered_at,
            schemas: self.schemata.values().map(Schema::summary).collect(),
        }
    }
}

impl Index<&str> for Engine {
    type Output = Schema;

    fn index(&self, schema: &str) -> &Schema {
        &self.schemata[schema]
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.schemata, f)
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("name", &self.name())
            .field("database", &self.client.database_name())
            .field("schemata", &self.schemata.list_item_keys())
            .field("exclusions", &self.exclusions)
            .field("discovered_at", &self.discovered_at)
            .finish()
    }
}
