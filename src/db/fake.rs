// ABOUTME: In-memory introspector for registry tests
// ABOUTME: Records schema queries and serves canned tables without a live server

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::introspect::{IntrospectError, Introspector, ReflectOptions};
use crate::models::{Table, TableKind};

#[derive(Default)]
pub struct FakeIntrospector {
    database: Option<String>,
    schemata: Vec<String>,
    tables: BTreeMap<String, Vec<Table>>,
    failing_schema: Option<String>,
    pub queries: Mutex<Vec<(String, Vec<String>)>>,
    pub reflected: Mutex<Vec<String>>,
}

impl FakeIntrospector {
    pub fn new(database: Option<&str>) -> Self {
        Self {
            database: database.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn with_schema(mut self, schema: &str, tables: &[&str]) -> Self {
        self.schemata.push(schema.to_string());
        let tables = tables
            .iter()
            .map(|name| Table::new(schema, *name, TableKind::Table))
            .collect();
        self.tables.insert(schema.to_string(), tables);
        self
    }

    /// Serve an extra table belonging to another schema when `schema` is reflected
    pub fn with_foreign_table(mut self, schema: &str, table: Table) -> Self {
        self.tables.entry(schema.to_string()).or_default().push(table);
        self
    }

    pub fn failing_on(mut self, schema: &str) -> Self {
        self.failing_schema = Some(schema.to_string());
        self
    }
}

#[async_trait]
impl Introspector for FakeIntrospector {
    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn server_version(&self) -> Result<String, IntrospectError> {
        Ok("PostgreSQL 16.0 (fake)".to_string())
    }

    async fn list_schemata(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<String>, IntrospectError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), params.to_vec()));

        // Only anchored literal prefixes are understood here
        let excluded = |name: &str| {
            params
                .iter()
                .any(|p| p.strip_prefix('^').is_some_and(|prefix| name.starts_with(prefix)))
        };
        Ok(self
            .schemata
            .iter()
            .filter(|s| !excluded(s.as_str()))
            .cloned()
            .collect())
    }

    async fn reflect_tables(
        &self,
        schema: &str,
        _options: &ReflectOptions,
    ) -> Result<Vec<Table>, IntrospectError> {
        if self.failing_schema.as_deref() == Some(schema) {
            return Err(IntrospectError::QueryFailed(format!(
                "permission denied for schema {}",
                schema
            )));
        }
        self.reflected.lock().unwrap().push(schema.to_string());
        Ok(self.tables.get(schema).cloned().unwrap_or_default())
    }
}
