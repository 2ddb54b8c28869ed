//! Diesel row models for tool registry persistence.

use super::schema::{
    mcp_server_credentials, mcp_server_health, mcp_server_tools, mcp_servers, registry_config,
};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for server records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mcp_servers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ServerRow {
    /// Internal server identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Transport kind.
    pub transport_kind: String,
    /// STDIO command.
    pub command: Option<String>,
    /// STDIO arguments.
    pub args: Value,
    /// Endpoint URL.
    pub url: Option<String>,
    /// Declared environment.
    pub env: Value,
    /// Enabled flag.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for server records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mcp_servers)]
pub struct NewServerRow {
    /// Internal server identifier.
    pub id: uuid::Uuid,
    /// Display name.
    pub name: String,
    /// Transport kind.
    pub transport_kind: String,
    /// STDIO command.
    pub command: Option<String>,
    /// STDIO arguments.
    pub args: Value,
    /// Endpoint URL.
    pub url: Option<String>,
    /// Declared environment.
    pub env: Value,
    /// Enabled flag.
    pub enabled: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset written by partial updates. Every column is rewritten.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = mcp_servers)]
#[diesel(treat_none_as_null = true)]
pub struct ServerChangeset {
    /// Display name.
    pub name: String,
    /// Transport kind.
    pub transport_kind: String,
    /// STDIO command.
    pub command: Option<String>,
    /// STDIO arguments.
    pub args: Value,
    /// Endpoint URL.
    pub url: Option<String>,
    /// Declared environment.
    pub env: Value,
    /// Enabled flag.
    pub enabled: bool,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for persisted tools.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = mcp_server_tools)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ToolRow {
    /// Tool name.
    pub name: String,
    /// Tool description.
    pub description: String,
    /// Input schema.
    pub input_schema: Value,
}

/// Insert model for persisted tools.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mcp_server_tools)]
pub struct NewToolRow {
    /// Owning server.
    pub server_id: uuid::Uuid,
    /// Tool name.
    pub name: String,
    /// Position within the saved set.
    pub position: i32,
    /// Server name at save time.
    pub server_name: String,
    /// Tool description.
    pub description: String,
    /// Input schema.
    pub input_schema: Value,
    /// Save timestamp.
    pub created_at: DateTime<Utc>,
}

/// Row model for health snapshots, used for both reads and upserts.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mcp_server_health)]
#[diesel(primary_key(server_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct HealthRow {
    /// Owning server.
    pub server_id: uuid::Uuid,
    /// Health status.
    pub status: String,
    /// Latency of the last successful check.
    pub latency_ms: Option<i64>,
    /// Failures since the last success.
    pub consecutive_failures: i32,
    /// Last check timestamp.
    pub last_checked_at: Option<DateTime<Utc>>,
    /// Last success timestamp.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

/// Insert model for credentials.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = mcp_server_credentials)]
pub struct NewCredentialRow {
    /// Owning server.
    pub server_id: uuid::Uuid,
    /// Environment variable name.
    pub credential_key: String,
    /// Ciphertext.
    pub encrypted_value: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for configuration entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = registry_config)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ConfigRow {
    /// Configuration key.
    pub config_key: String,
    /// JSON-encoded value.
    pub config_value: Value,
}

/// Insert model for configuration entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = registry_config)]
pub struct NewConfigRow {
    /// Configuration key.
    pub config_key: String,
    /// JSON-encoded value.
    pub config_value: Value,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
