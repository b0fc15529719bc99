// ABOUTME: Reflection backend trait used by the registry
// ABOUTME: Also assembles raw information_schema rows into table metadata

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Column, ForeignKey, Table, TableKind, UniqueConstraint};

#[derive(Error, Debug)]
pub enum IntrospectError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
}

/// Options for a single schema reflection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectOptions {
    pub include_views: bool,
}

/// A live database handle the registry can probe for schemata and tables.
///
/// `list_schemata` receives a ready-built query and its positional
/// parameters; `reflect_tables` returns tables keyed by their own
/// `schema` field, which may differ from the requested schema.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// Name of the database this handle is connected to, if known
    fn database_name(&self) -> Option<&str>;

    async fn server_version(&self) -> Result<String, IntrospectError>;

    async fn list_schemata(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<String>, IntrospectError>;

    async fn reflect_tables(
        &self,
        schema: &str,
        options: &ReflectOptions,
    ) -> Result<Vec<Table>, IntrospectError>;
}

#[derive(Debug, Clone)]
pub(crate) struct TableRow {
    pub table_name: String,
    pub table_type: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ColumnRow {
    pub table_name: String,
    pub column: Column,
}

#[derive(Debug, Clone)]
pub(crate) struct KeyConstraintRow {
    pub table_name: String,
    pub constraint_name: String,
    pub constraint_type: String,
    pub column_name: String,
}

#[derive(Debug, Clone)]
pub(crate) struct ForeignKeyRow {
    pub table_name: String,
    pub constraint_name: String,
    pub column_name: String,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Build table metadata for one schema from the raw rows.
///
/// Rows must arrive ordered by table, constraint and column position.
/// Rows referring to tables that were filtered out are dropped.
pub(crate) fn assemble_tables(
    schema: &str,
    options: &ReflectOptions,
    tables: Vec<TableRow>,
    columns: Vec<ColumnRow>,
    keys: Vec<KeyConstraintRow>,
    foreign_keys: Vec<ForeignKeyRow>,
) -> Vec<Table> {
    let mut by_name: BTreeMap<String, Table> = BTreeMap::new();

    for row in tables {
        let Some(kind) = TableKind::from_table_type(&row.table_type) else {
            continue;
        };
        if kind == TableKind::View && !options.include_views {
            continue;
        }
        by_name.insert(row.table_name.clone(), Table::new(schema, row.table_name, kind));
    }

    for row in columns {
        if let Some(table) = by_name.get_mut(&row.table_name) {
            table.columns.push(row.column);
        }
    }

    for row in keys {
        let Some(table) = by_name.get_mut(&row.table_name) else {
            continue;
        };
        match row.constraint_type.as_str() {
            "PRIMARY KEY" => table.primary_key.push(row.column_name),
            "UNIQUE" => match table.unique_constraints.last_mut() {
                Some(last) if last.name == row.constraint_name => last.columns.push(row.column_name),
                _ => table.unique_constraints.push(UniqueConstraint {
                    name: row.constraint_name,
                    columns: vec![row.column_name],
                }),
            },
            _ => {}
        }
    }

    for row in foreign_keys {
        let Some(table) = by_name.get_mut(&row.table_name) else {
            continue;
        };
        match table.foreign_keys.last_mut() {
            Some(last) if last.name == row.constraint_name => {
                last.columns.push(row.column_name);
                last.referenced_columns.push(row.referenced_column);
            }
            _ => table.foreign_keys.push(ForeignKey {
                name: row.constraint_name,
                columns: vec![row.column_name],
                referenced_schema: row.referenced_schema,
                referenced_table: row.referenced_table,
                referenced_columns: vec![row.referenced_column],
            }),
        }
    }

    by_name.into_values().collect()
}
