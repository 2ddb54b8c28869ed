//! `PostgreSQL` adapter for tool registry persistence.

mod models;
mod repository;
mod schema;

pub use repository::{PostgresToolRegistryStore, ToolRegistryPgPool};
