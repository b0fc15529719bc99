// ABOUTME: Error types for the engine/schema/table registry
// ABOUTME: Not-found errors carry the kind of item that was missing

use std::fmt;

use thiserror::Error;

use crate::db::IntrospectError;

/// The level of the registry an item lives at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Engine,
    Schema,
    Table,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Engine => "engine",
            ItemKind::Schema => "schema",
            ItemKind::Table => "table",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{}", not_found_message(.kind, .name, .detail.as_deref()))]
    NotFound {
        kind: ItemKind,
        name: String,
        detail: Option<String>,
    },
    #[error("Cannot detect engine name from connection. Specify engine name in arguments.")]
    EngineNameUnresolved,
    #[error("Invalid registry path: '{0}'")]
    InvalidPath(String),
    #[error("Failed to reflect schema '{schema}': {source}")]
    Reflection {
        schema: String,
        #[source]
        source: IntrospectError,
    },
    #[error("Introspection failed: {0}")]
    Introspect(#[from] IntrospectError),
}

impl RegistryError {
    pub fn not_found(kind: ItemKind, name: impl Into<String>) -> Self {
        RegistryError::NotFound {
            kind,
            name: name.into(),
            detail: None,
        }
    }

    /// Attach extra context that is appended to the not-found message
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        match self {
            RegistryError::NotFound { kind, name, .. } => RegistryError::NotFound {
                kind,
                name,
                detail: Some(detail.into()),
            },
            other => other,
        }
    }
}

fn not_found_message(kind: &ItemKind, name: &str, detail: Option<&str>) -> String {
    let base = format!("No {} named '{}' was found.", kind, name);
    match detail {
        Some(detail) if !detail.is_empty() => format!("{} {}", base, detail),
        _ => base,
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
