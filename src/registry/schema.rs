// ABOUTME: Schema wrapper holding the reflected tables of one namespace
// ABOUTME: Re-indexes reflected tables so they are reachable by bare name

use std::fmt;
use std::ops::Index;

use crate::db::{Introspector, ReflectOptions};
use crate::error::{ItemKind, RegistryError, Result};
use crate::models::{SchemaSummary, Table};

use super::catalog::Catalog;

#[derive(Debug)]
pub struct Schema {
    engine_name: String,
    tables: Catalog<Table>,
}

impl Schema {
    pub(crate) fn new(name: impl Into<String>, engine_name: impl Into<String>) -> Self {
        Self {
            engine_name: engine_name.into(),
            tables: Catalog::new("Schema", name, ItemKind::Table),
        }
    }

    pub fn name(&self) -> &str {
        self.tables.name()
    }

    /// Name of the engine this schema was registered on
    pub fn engine_name(&self) -> &str {
        &self.engine_name
    }

    pub fn tables(&self) -> &Catalog<Table> {
        &self.tables
    }

    pub fn get(&self, table: &str) -> Result<&Table> {
        self.tables.get(table)
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(table)
    }

    /// Reflect every table in this schema, replacing what was known before
    pub async fn discover(
        &mut self,
        client: &dyn Introspector,
        options: &ReflectOptions,
    ) -> Result<()> {
        let tables = client
            .reflect_tables(self.name(), options)
            .await
            .map_err(|source| RegistryError::Reflection {
                schema: self.name().to_string(),
                source,
            })?;

        log::debug!(
            "Reflected {} tables in schema '{}' on engine '{}'",
            tables.len(),
            self.name(),
            self.engine_name
        );

        self.tables.clear();
        self.reindex(tables);
        Ok(())
    }

    /// Key tables by bare name; tables from other schemas keep their qualified name
    fn reindex(&mut self, tables: Vec<Table>) {
        let prefix = format!("{}.", self.name());
        for table in tables {
            let qualified = table.qualified_name();
            let key = match qualified.strip_prefix(&prefix) {
                Some(bare) => bare.to_string(),
                None => qualified,
            };
            self.tables.insert(key, table);
        }
    }

    pub fn summary(&self) -> SchemaSummary {
        SchemaSummary {
            name: self.name().to_string(),
            tables: self.tables.list_item_keys(),
        }
    }
}

impl Index<&str> for Schema {
    type Output = Table;

    fn index(&self, table: &str) -> &Table {
        &self.tables[table]
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.tables, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fake::FakeIntrospector;
    use crate::models::TableKind;

    #[tokio::test]
    async fn test_discover_indexes_by_bare_name() {
        let fake = FakeIntrospector::new(Some("shop"))
            .with_schema("public", &["orders", "customers"])
            .with_foreign_table("public", Table::new("billing", "invoices", TableKind::Table));

        let mut schema = Schema::new("public", "shop");
        schema.discover(&fake, &ReflectOptions::default()).await.unwrap();

        assert_eq!(
            schema.tables().list_item_keys(),
            vec!["billing.invoices", "customers", "orders"]
        );
        assert_eq!(schema["orders"].qualified_name(), "public.orders");
        assert_eq!(schema.get("billing.invoices").unwrap().schema, "billing");
        assert!(!schema.contains("invoices"));
    }

    #[tokio::test]
    async fn test_rediscover_replaces_tables() {
        let mut schema = Schema::new("public", "shop");
        schema
            .discover(
                &FakeIntrospector::new(None).with_schema("public", &["old"]),
                &ReflectOptions::default(),
            )
            .await
            .unwrap();
        schema
            .discover(
                &FakeIntrospector::new(None).with_schema("public", &["new"]),
                &ReflectOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(schema.tables().list_item_keys(), vec!["new"]);
    }

    #[tokio::test]
    async fn test_discover_failure_names_schema() {
        let fake = FakeIntrospector::new(None)
            .with_schema("secret", &["keys"])
            .failing_on("secret");

        let mut schema = Schema::new("secret", "shop");
        let err = schema
            .discover(&fake, &ReflectOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RegistryError::Reflection { ref schema, .. } if schema == "secret"));
        assert!(schema.tables().is_empty());
    }

    #[test]
    fn test_missing_table_and_display() {
        let schema = Schema::new("public", "shop");
        let err = schema.get("orders").unwrap_err();
        assert_eq!(err.to_string(), "No table named 'orders' was found.");
        assert_eq!(schema.to_string(), "Schema(public)");
        assert_eq!(schema.engine_name(), "shop");
    }
}
