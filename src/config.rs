//! Process configuration for the storage layer, read from the environment.

use crate::tool_registry::adapters::postgres::ToolRegistryPgPool;
use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Primary database URL variable.
pub const DATABASE_URL_VAR: &str = "SWITCHBOARD_DATABASE_URL";
/// Database URL variable consulted when [`DATABASE_URL_VAR`] is unset.
pub const FALLBACK_DATABASE_URL_VAR: &str = "DATABASE_URL";
/// Maximum pooled connections variable.
pub const POOL_SIZE_VAR: &str = "SWITCHBOARD_DB_POOL_SIZE";
/// Connection checkout timeout variable, in seconds.
pub const CONNECT_TIMEOUT_VAR: &str = "SWITCHBOARD_DB_CONNECT_TIMEOUT_SECS";

/// Default maximum pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 8;
/// Default connection checkout timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while loading settings or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither database URL variable is set.
    #[error("SWITCHBOARD_DATABASE_URL or DATABASE_URL must be set")]
    MissingDatabaseUrl,
    /// A numeric variable could not be parsed.
    #[error("{variable} must be a positive integer, got '{value}'")]
    InvalidNumber {
        /// Variable name.
        variable: &'static str,
        /// Raw value.
        value: String,
    },
    /// The pool could not be created.
    #[error("failed to build database pool: {0}")]
    Pool(#[from] PoolError),
}

/// Connection settings for the `PostgreSQL` store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSettings {
    database_url: String,
    pool_size: u32,
    connect_timeout: Duration,
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("StoreSettings")
            .field("database_url", &"<redacted>")
            .field("pool_size", &self.pool_size)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl StoreSettings {
    /// Creates settings with default pool size and timeout.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Overrides the maximum number of pooled connections.
    #[must_use]
    pub const fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Overrides the connection checkout timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Loads settings from the process environment.
    ///
    /// # Errors
    ///
    /// See [`StoreSettings::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads settings through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when no URL is configured
    /// and [`ConfigError::InvalidNumber`] for unparsable or zero numbers.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let database_url = read(DATABASE_URL_VAR)
            .or_else(|| read(FALLBACK_DATABASE_URL_VAR))
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let mut settings = Self::new(database_url);
        if let Some(raw) = read(POOL_SIZE_VAR) {
            settings.pool_size = parse_positive(POOL_SIZE_VAR, &raw)?;
        }
        if let Some(raw) = read(CONNECT_TIMEOUT_VAR) {
            settings.connect_timeout =
                Duration::from_secs(parse_positive(CONNECT_TIMEOUT_VAR, &raw)?);
        }
        Ok(settings)
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum number of pooled connections.
    #[must_use]
    pub const fn pool_size(&self) -> u32 {
        self.pool_size
    }

    /// Returns the connection checkout timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Builds the r2d2 pool backing
    /// [`PostgresToolRegistryStore`](crate::tool_registry::adapters::postgres::PostgresToolRegistryStore).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the initial connections cannot be
    /// established within the timeout.
    pub fn build_pool(&self) -> Result<ToolRegistryPgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(self.database_url.as_str());
        Ok(Pool::builder()
            .max_size(self.pool_size)
            .connection_timeout(self.connect_timeout)
            .build(manager)?)
    }
}

fn parse_positive<N>(variable: &'static str, raw: &str) -> Result<N, ConfigError>
where
    N: std::str::FromStr + PartialEq + Default,
{
    raw.parse::<N>()
        .ok()
        .filter(|value| *value != N::default())
        .ok_or_else(|| ConfigError::InvalidNumber {
            variable,
            value: raw.to_owned(),
        })
}
