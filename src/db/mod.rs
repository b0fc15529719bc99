// ABOUTME: Database module exports for schema-atlas
// ABOUTME: Contains the reflection backend trait and the PostgreSQL implementation

pub mod introspect;
pub mod postgres;

#[cfg(test)]
pub(crate) mod fake;

pub use introspect::{IntrospectError, Introspector, ReflectOptions};
pub use postgres::PostgresConnection;
