//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use rstest::fixture;
use std::time::Duration;
use switchboard::config::StoreSettings;
use switchboard::tool_registry::adapters::postgres::{PostgresToolRegistryStore, ToolRegistryPgPool};
use uuid::Uuid;

/// Boxed error type used by fixtures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Variable naming an administrative connection URL for test databases.
pub const TEST_PG_URL_VAR: &str = "SWITCHBOARD_TEST_PG_URL";

/// Schema applied to every throwaway database.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-17-000000_create_tool_registry/up.sql");

/// A database created for one test and dropped when this value is dropped.
pub struct TemporaryDatabase {
    admin_url: String,
    name: String,
    url: String,
}

impl TemporaryDatabase {
    /// Creates a uniquely named database and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns an error when the server is unreachable or the schema fails.
    pub fn create(admin_url: &str) -> Result<Self, BoxError> {
        let name = format!("switchboard_test_{}", Uuid::new_v4().simple());
        let mut admin = PgConnection::establish(admin_url)?;
        admin.batch_execute(&format!("CREATE DATABASE \"{name}\""))?;

        let database = Self {
            admin_url: admin_url.to_owned(),
            url: with_database(admin_url, &name),
            name,
        };
        let mut connection = PgConnection::establish(&database.url)?;
        connection.batch_execute(CREATE_SCHEMA_SQL)?;
        Ok(database)
    }

    /// Returns the connection URL of this database.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        if let Ok(mut admin) = PgConnection::establish(&self.admin_url) {
            let statement = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
            if let Err(err) = admin.batch_execute(&statement) {
                tracing::warn!(database = %self.name, error = %err, "failed to drop test database");
            }
        }
    }
}

/// Store bound to a throwaway database.
pub struct PgContext {
    /// Store under test.
    pub store: PostgresToolRegistryStore,
    /// Pool shared with the store, for direct SQL checks.
    pub pool: ToolRegistryPgPool,
    /// Keeps the database alive for the test's duration.
    pub _database: TemporaryDatabase,
}

/// Provisions a store bound to a fresh database.
///
/// # Errors
///
/// Returns an error when `SWITCHBOARD_TEST_PG_URL` is unset or blank, or
/// when provisioning fails against the configured server.
#[fixture]
pub fn pg_context() -> Result<PgContext, BoxError> {
    let admin_url = std::env::var(TEST_PG_URL_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{TEST_PG_URL_VAR} must name a PostgreSQL server for these tests"),
            )) as BoxError
        })?;

    let database = TemporaryDatabase::create(&admin_url)?;
    let pool = StoreSettings::new(database.url())
        .with_pool_size(2)
        .with_connect_timeout(Duration::from_secs(10))
        .build_pool()?;
    Ok(PgContext {
        store: PostgresToolRegistryStore::new(pool.clone()),
        pool,
        _database: database,
    })
}

fn with_database(url: &str, database: &str) -> String {
    let (base, query) = url.split_once('?').map_or((url, None), |(head, tail)| (head, Some(tail)));
    let authority_start = base.find("://").map_or(0, |index| index + 3);
    let root = base
        .get(authority_start..)
        .and_then(|rest| rest.find('/'))
        .and_then(|slash| base.get(..authority_start + slash))
        .unwrap_or(base);

    match query {
        Some(params) => format!("{root}/{database}?{params}"),
        None => format!("{root}/{database}"),
    }
}

mod tests {
    use super::with_database;
    use rstest::rstest;

    #[rstest]
    #[case("postgres://u:p@localhost:5432/postgres", "postgres://u:p@localhost:5432/db")]
    #[case("postgres://localhost", "postgres://localhost/db")]
    #[case(
        "postgres://localhost/postgres?sslmode=disable",
        "postgres://localhost/db?sslmode=disable"
    )]
    fn database_name_is_swapped(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(with_database(url, "db"), expected);
    }
}
