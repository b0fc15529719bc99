// ABOUTME: PostgreSQL connection management using tokio-postgres
// ABOUTME: Lists schemata and reflects tables through information_schema

use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, Config, NoTls, Row};

use super::introspect::{
    assemble_tables, ColumnRow, ForeignKeyRow, IntrospectError, Introspector, KeyConstraintRow,
    ReflectOptions, TableRow,
};
use crate::config::ConnectionProfile;
use crate::models::{Column, Table};

const TABLES_QUERY: &str = include_str!("queries/tables.sql");
const COLUMNS_QUERY: &str = include_str!("queries/columns.sql");
const KEY_CONSTRAINTS_QUERY: &str = include_str!("queries/key_constraints.sql");
const FOREIGN_KEYS_QUERY: &str = include_str!("queries/foreign_keys.sql");

pub struct PostgresConnection {
    client: Client,
    database: Option<String>,
}

impl PostgresConnection {
    /// Connect to PostgreSQL using a connection profile
    pub async fn connect(profile: &ConnectionProfile) -> Result<Self, IntrospectError> {
        let mut config = Config::new();
        config
            .host(&profile.host)
            .port(profile.port)
            .user(&profile.username)
            .application_name("schema-atlas")
            .connect_timeout(Duration::from_secs(profile.connect_timeout_secs));

        if !profile.password.is_empty() {
            config.password(&profile.password);
        }
        if let Some(database) = &profile.database {
            config.dbname(database);
        }

        let (client, connection) = config
            .connect(NoTls)
            .await
            .map_err(|e| IntrospectError::ConnectionFailed(e.to_string()))?;

        let host = profile.host.clone();
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("Connection to {} closed with error: {}", host, e);
            }
        });

        log::debug!(
            "Connected to {}:{} as {}",
            profile.host,
            profile.port,
            profile.username
        );

        Ok(Self {
            client,
            database: profile.database.clone(),
        })
    }

    /// Underlying client, for running work against the same connection
    pub fn client(&self) -> &Client {
        &self.client
    }

    async fn query_schema(&self, query: &str, schema: &str) -> Result<Vec<Row>, IntrospectError> {
        self.client
            .query(query, &[&schema])
            .await
            .map_err(|e| IntrospectError::QueryFailed(e.to_string()))
    }
}

fn table_row(row: &Row) -> Result<TableRow, tokio_postgres::Error> {
    Ok(TableRow {
        table_name: row.try_get("table_name")?,
        table_type: row.try_get("table_type")?,
    })
}

fn column_row(row: &Row) -> Result<ColumnRow, tokio_postgres::Error> {
    Ok(ColumnRow {
        table_name: row.try_get("table_name")?,
        column: Column {
            name: row.try_get("column_name")?,
            position: row.try_get("position")?,
            data_type: row.try_get("data_type")?,
            udt_name: row.try_get("udt_name")?,
            nullable: row.try_get("is_nullable")?,
            default: row.try_get("column_default")?,
            max_length: row.try_get("max_length")?,
        },
    })
}

fn key_constraint_row(row: &Row) -> Result<KeyConstraintRow, tokio_postgres::Error> {
    Ok(KeyConstraintRow {
        table_name: row.try_get("table_name")?,
        constraint_name: row.try_get("constraint_name")?,
        constraint_type: row.try_get("constraint_type")?,
        column_name: row.try_get("column_name")?,
    })
}

fn foreign_key_row(row: &Row) -> Result<ForeignKeyRow, tokio_postgres::Error> {
    Ok(ForeignKeyRow {
        table_name: row.try_get("table_name")?,
        constraint_name: row.try_get("constraint_name")?,
        column_name: row.try_get("column_name")?,
        referenced_schema: row.try_get("referenced_schema")?,
        referenced_table: row.try_get("referenced_table")?,
        referenced_column: row.try_get("referenced_column")?,
    })
}

#[async_trait]
impl Introspector for PostgresConnection {
    fn database_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    async fn server_version(&self) -> Result<String, IntrospectError> {
        let row = self.client.query_one("SELECT version()", &[]).await?;
        Ok(row.try_get(0)?)
    }

    async fn list_schemata(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<String>, IntrospectError> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

        let rows = self
            .client
            .query(query, &params)
            .await
            .map_err(|e| IntrospectError::QueryFailed(e.to_string()))?;

        let schemata = rows
            .iter()
            .map(|row| row.try_get::<_, String>("schema_name"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(schemata)
    }

    async fn reflect_tables(
        &self,
        schema: &str,
        options: &ReflectOptions,
    ) -> Result<Vec<Table>, IntrospectError> {
        // order matters: later rows attach to tables found earlier
        let tables = self
            .query_schema(TABLES_QUERY, schema)
            .await?
            .iter()
            .map(table_row)
            .collect::<Result<Vec<_>, _>>()?;
        let columns = self
            .query_schema(COLUMNS_QUERY, schema)
            .await?
            .iter()
            .map(column_row)
            .collect::<Result<Vec<_>, _>>()?;
        let keys = self
            .query_schema(KEY_CONSTRAINTS_QUERY, schema)
            .await?
            .iter()
            .map(key_constraint_row)
            .collect::<Result<Vec<_>, _>>()?;
        let foreign_keys = self
            .query_schema(FOREIGN_KEYS_QUERY, schema)
            .await?
            .iter()
            .map(foreign_key_row)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Schema '{}': {} tables, {} columns, {} key columns, {} foreign key columns",
            schema,
            tables.len(),
            columns.len(),
            keys.len(),
            foreign_keys.len()
        );

        Ok(assemble_tables(schema, options, tables, columns, keys, foreign_keys))
    }
}
