//! `PostgreSQL` store implementation for the tool registry.

use super::{
    models::{
        ConfigRow, HealthRow, NewConfigRow, NewCredentialRow, NewServerRow, NewToolRow,
        ServerChangeset, ServerRow, ToolRow,
    },
    schema::{
        mcp_server_credentials, mcp_server_health, mcp_server_tools, mcp_servers, registry_config,
    },
};
use crate::tool_registry::{
    domain::{
        CredentialKey, EncryptedSecret, GlobalConfig, GlobalConfigPatch, HealthRecord,
        HealthStatus, NewServerConfig, Page, PageRequest, PersistedServerConfigData, ServerConfig,
        ServerConfigUpdate, ServerEnv, ServerId, ServerName, ServerTransport, ToolDefinition,
        ToolManifest, TransportKind, ensure_unique_tool_names,
    },
    ports::{ToolRegistryStore, ToolRegistryStoreError, ToolRegistryStoreResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::upsert::excluded;
use mockable::{Clock, DefaultClock};
use std::sync::Arc;

/// `PostgreSQL` connection pool type for tool registry adapters.
pub type ToolRegistryPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed tool registry store.
///
/// `save_tools`, `set_config`, and `update_server` run inside a single
/// transaction; Diesel rolls back on any error and the pooled connection is
/// returned when the closure exits.
#[derive(Clone)]
pub struct PostgresToolRegistryStore {
    pool: ToolRegistryPgPool,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl PostgresToolRegistryStore {
    /// Creates a store from a `PostgreSQL` pool, stamped with the system clock.
    #[must_use]
    pub fn new(pool: ToolRegistryPgPool) -> Self {
        Self::with_clock(pool, Arc::new(DefaultClock))
    }

    /// Creates a store from a `PostgreSQL` pool and an explicit clock.
    #[must_use]
    pub const fn with_clock(pool: ToolRegistryPgPool, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self { pool, clock }
    }

    async fn run_blocking<F, T>(&self, operation: F) -> ToolRegistryStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ToolRegistryStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(ToolRegistryStoreError::persistence)?;
            operation(&mut connection)
        })
        .await
        .map_err(ToolRegistryStoreError::persistence)?
    }
}

#[async_trait]
impl ToolRegistryStore for PostgresToolRegistryStore {
    async fn add_server(&self, input: NewServerConfig) -> ToolRegistryStoreResult<ServerConfig> {
        let server = ServerConfig::new(input, &*self.clock);
        let new_row = to_new_server_row(&server)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(mcp_servers::table)
                .values(&new_row)
                .execute(connection)?;
            Ok(server)
        })
        .await
    }

    async fn get_server(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Option<ServerConfig>> {
        self.run_blocking(move |connection| {
            let row = mcp_servers::table
                .find(server_id.into_inner())
                .select(ServerRow::as_select())
                .first::<ServerRow>(connection)
                .optional()?;
            row.map(row_to_server).transpose()
        })
        .await
    }

    async fn find_server_by_name(
        &self,
        server_name: &ServerName,
    ) -> ToolRegistryStoreResult<Option<ServerConfig>> {
        let name = server_name.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = mcp_servers::table
                .filter(mcp_servers::name.eq(&name))
                .order((mcp_servers::created_at.asc(), mcp_servers::id.asc()))
                .select(ServerRow::as_select())
                .first::<ServerRow>(connection)
                .optional()?;
            row.map(row_to_server).transpose()
        })
        .await
    }

    async fn list_servers(
        &self,
        page: PageRequest,
    ) -> ToolRegistryStoreResult<Page<ServerConfig>> {
        let limit = i64::from(page.limit());
        let offset = i64::try_from(page.offset()).map_err(ToolRegistryStoreError::persistence)?;

        self.run_blocking(move |connection| {
            let total_rows: i64 = mcp_servers::table.count().get_result(connection)?;
            let rows = mcp_servers::table
                .order((mcp_servers::created_at.asc(), mcp_servers::id.asc()))
                .limit(limit)
                .offset(offset)
                .select(ServerRow::as_select())
                .load::<ServerRow>(connection)?;

            let items = rows
                .into_iter()
                .map(row_to_server)
                .collect::<ToolRegistryStoreResult<Vec<_>>>()?;
            let total = u64::try_from(total_rows).map_err(ToolRegistryStoreError::persistence)?;
            Ok(Page::new(items, total))
        })
        .await
    }

    async fn update_server(
        &self,
        server_id: ServerId,
        update: &ServerConfigUpdate,
    ) -> ToolRegistryStoreResult<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let owned_update = update.clone();
        let clock = Arc::clone(&self.clock);
        self.run_blocking(move |connection| {
            connection.transaction::<_, ToolRegistryStoreError, _>(|tx| {
                let locked_row = mcp_servers::table
                    .find(server_id.into_inner())
                    .select(ServerRow::as_select())
                    .for_update()
                    .first::<ServerRow>(tx)
                    .optional()?;
                let Some(row) = locked_row else {
                    return Ok(false);
                };

                let mut server = row_to_server(row)?;
                server.apply_update(&owned_update, &*clock);
                let changeset = to_server_changeset(&server)?;
                let updated = diesel::update(mcp_servers::table.find(server_id.into_inner()))
                    .set(&changeset)
                    .execute(tx)?;
                Ok(updated > 0)
            })
        })
        .await
    }

    async fn delete_server(&self, server_id: ServerId) -> ToolRegistryStoreResult<bool> {
        self.run_blocking(move |connection| {
            let deleted =
                diesel::delete(mcp_servers::table.find(server_id.into_inner())).execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn save_tools(
        &self,
        server_id: ServerId,
        server_name: &ServerName,
        tools: &[ToolManifest],
    ) -> ToolRegistryStoreResult<()> {
        ensure_unique_tool_names(tools)?;
        let rows = to_new_tool_rows(server_id, server_name, tools, self.clock.utc())?;

        self.run_blocking(move |connection| {
            connection.transaction::<_, ToolRegistryStoreError, _>(|tx| {
                diesel::delete(
                    mcp_server_tools::table
                        .filter(mcp_server_tools::server_id.eq(server_id.into_inner())),
                )
                .execute(tx)?;

                if !rows.is_empty() {
                    diesel::insert_into(mcp_server_tools::table)
                        .values(&rows)
                        .execute(tx)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn load_tools(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Vec<ToolDefinition>> {
        self.run_blocking(move |connection| {
            let server_row = mcp_servers::table
                .find(server_id.into_inner())
                .select(ServerRow::as_select())
                .first::<ServerRow>(connection)
                .optional()?;
            let Some(row) = server_row else {
                return Ok(Vec::new());
            };
            let server = row_to_server(row)?;

            let rows = mcp_server_tools::table
                .filter(mcp_server_tools::server_id.eq(server_id.into_inner()))
                .order(mcp_server_tools::position.asc())
                .select(ToolRow::as_select())
                .load::<ToolRow>(connection)?;

            rows.into_iter()
                .map(|row| {
                    let manifest = ToolManifest::new(row.name, row.description, row.input_schema)
                        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;
                    Ok(ToolDefinition::from_manifest(
                        manifest,
                        server.id(),
                        server.name().clone(),
                    ))
                })
                .collect()
        })
        .await
    }

    async fn delete_tools(&self, server_id: ServerId) -> ToolRegistryStoreResult<usize> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                mcp_server_tools::table
                    .filter(mcp_server_tools::server_id.eq(server_id.into_inner())),
            )
            .execute(connection)?;
            Ok(deleted)
        })
        .await
    }

    async fn get_config(&self) -> ToolRegistryStoreResult<GlobalConfig> {
        self.run_blocking(load_config).await
    }

    async fn set_config(
        &self,
        patch: &GlobalConfigPatch,
    ) -> ToolRegistryStoreResult<GlobalConfig> {
        let updated_at = self.clock.utc();
        let rows: Vec<NewConfigRow> = patch
            .entries()
            .into_iter()
            .map(|(key, value)| NewConfigRow {
                config_key: key.as_str().to_owned(),
                config_value: value,
                updated_at,
            })
            .collect();

        self.run_blocking(move |connection| {
            if rows.is_empty() {
                return load_config(connection);
            }

            connection.transaction::<_, ToolRegistryStoreError, _>(|tx| {
                diesel::insert_into(registry_config::table)
                    .values(&rows)
                    .on_conflict(registry_config::config_key)
                    .do_update()
                    .set((
                        registry_config::config_value.eq(excluded(registry_config::config_value)),
                        registry_config::updated_at.eq(excluded(registry_config::updated_at)),
                    ))
                    .execute(tx)?;
                load_config(tx)
            })
        })
        .await
    }

    async fn save_health(&self, record: &HealthRecord) -> ToolRegistryStoreResult<()> {
        let row = to_health_row(record)?;
        self.run_blocking(move |connection| {
            diesel::insert_into(mcp_server_health::table)
                .values(&row)
                .on_conflict(mcp_server_health::server_id)
                .do_update()
                .set(&row)
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn get_health(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Option<HealthRecord>> {
        self.run_blocking(move |connection| {
            let row = mcp_server_health::table
                .find(server_id.into_inner())
                .select(HealthRow::as_select())
                .first::<HealthRow>(connection)
                .optional()?;
            row.map(row_to_health).transpose()
        })
        .await
    }

    async fn get_all_health(&self) -> ToolRegistryStoreResult<Vec<HealthRecord>> {
        self.run_blocking(move |connection| {
            let rows = mcp_server_health::table
                .order(mcp_server_health::server_id.asc())
                .select(HealthRow::as_select())
                .load::<HealthRow>(connection)?;
            rows.into_iter().map(row_to_health).collect()
        })
        .await
    }

    async fn save_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
        value: &EncryptedSecret,
    ) -> ToolRegistryStoreResult<()> {
        let now = self.clock.utc();
        let row = NewCredentialRow {
            server_id: server_id.into_inner(),
            credential_key: key.as_str().to_owned(),
            encrypted_value: value.expose().to_owned(),
            created_at: now,
            updated_at: now,
        };

        self.run_blocking(move |connection| {
            diesel::insert_into(mcp_server_credentials::table)
                .values(&row)
                .on_conflict((
                    mcp_server_credentials::server_id,
                    mcp_server_credentials::credential_key,
                ))
                .do_update()
                .set((
                    mcp_server_credentials::encrypted_value
                        .eq(excluded(mcp_server_credentials::encrypted_value)),
                    mcp_server_credentials::updated_at
                        .eq(excluded(mcp_server_credentials::updated_at)),
                ))
                .execute(connection)?;
            Ok(())
        })
        .await
    }

    async fn get_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<Option<EncryptedSecret>> {
        let credential_key = key.as_str().to_owned();
        self.run_blocking(move |connection| {
            let value = mcp_server_credentials::table
                .find((server_id.into_inner(), &credential_key))
                .select(mcp_server_credentials::encrypted_value)
                .first::<String>(connection)
                .optional()?;
            Ok(value.map(EncryptedSecret::new))
        })
        .await
    }

    async fn list_credential_keys(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Vec<CredentialKey>> {
        self.run_blocking(move |connection| {
            let keys = mcp_server_credentials::table
                .filter(mcp_server_credentials::server_id.eq(server_id.into_inner()))
                .order(mcp_server_credentials::credential_key.asc())
                .select(mcp_server_credentials::credential_key)
                .load::<String>(connection)?;
            keys.into_iter()
                .map(|key| {
                    CredentialKey::new(key).map_err(ToolRegistryStoreError::invalid_persisted_data)
                })
                .collect()
        })
        .await
    }

    async fn delete_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<bool> {
        let credential_key = key.as_str().to_owned();
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(
                mcp_server_credentials::table.find((server_id.into_inner(), &credential_key)),
            )
            .execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }
}

fn load_config(connection: &mut PgConnection) -> ToolRegistryStoreResult<GlobalConfig> {
    let rows = registry_config::table
        .select(ConfigRow::as_select())
        .load::<ConfigRow>(connection)?;
    Ok(GlobalConfig::from_stored(
        rows.into_iter().map(|row| (row.config_key, row.config_value)),
    ))
}

struct SerializedTransport {
    transport_kind: String,
    command: Option<String>,
    args: serde_json::Value,
    url: Option<String>,
}

fn serialize_transport(
    transport: &ServerTransport,
) -> ToolRegistryStoreResult<SerializedTransport> {
    Ok(SerializedTransport {
        transport_kind: transport.kind().as_str().to_owned(),
        command: transport.command().map(str::to_owned),
        args: serde_json::to_value(transport.args())
            .map_err(ToolRegistryStoreError::persistence)?,
        url: transport.url().map(str::to_owned),
    })
}

fn to_new_server_row(server: &ServerConfig) -> ToolRegistryStoreResult<NewServerRow> {
    let transport = serialize_transport(server.transport())?;
    let env = serde_json::to_value(server.env()).map_err(ToolRegistryStoreError::persistence)?;

    Ok(NewServerRow {
        id: server.id().into_inner(),
        name: server.name().as_str().to_owned(),
        transport_kind: transport.transport_kind,
        command: transport.command,
        args: transport.args,
        url: transport.url,
        env,
        enabled: server.is_enabled(),
        created_at: server.created_at(),
        updated_at: server.updated_at(),
    })
}

fn to_server_changeset(server: &ServerConfig) -> ToolRegistryStoreResult<ServerChangeset> {
    let transport = serialize_transport(server.transport())?;
    let env = serde_json::to_value(server.env()).map_err(ToolRegistryStoreError::persistence)?;

    Ok(ServerChangeset {
        name: server.name().as_str().to_owned(),
        transport_kind: transport.transport_kind,
        command: transport.command,
        args: transport.args,
        url: transport.url,
        env,
        enabled: server.is_enabled(),
        updated_at: server.updated_at(),
    })
}

fn row_to_server(row: ServerRow) -> ToolRegistryStoreResult<ServerConfig> {
    let ServerRow {
        id,
        name,
        transport_kind,
        command,
        args,
        url,
        env,
        enabled,
        created_at,
        updated_at,
    } = row;

    let parsed_name =
        ServerName::new(name).map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let parsed_kind = TransportKind::try_from(transport_kind.as_str())
        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let parsed_args: Vec<String> =
        serde_json::from_value(args).map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let parsed_transport = ServerTransport::from_parts(parsed_kind, command, parsed_args, url)
        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let parsed_env: ServerEnv =
        serde_json::from_value(env).map_err(ToolRegistryStoreError::invalid_persisted_data)?;

    Ok(ServerConfig::from_persisted(PersistedServerConfigData {
        id: ServerId::from_uuid(id),
        name: parsed_name,
        transport: parsed_transport,
        env: parsed_env,
        enabled,
        created_at,
        updated_at,
    }))
}

fn to_new_tool_rows(
    server_id: ServerId,
    server_name: &ServerName,
    tools: &[ToolManifest],
    created_at: DateTime<Utc>,
) -> ToolRegistryStoreResult<Vec<NewToolRow>> {
    tools
        .iter()
        .enumerate()
        .map(|(index, tool)| {
            let position = i32::try_from(index).map_err(ToolRegistryStoreError::persistence)?;
            Ok(NewToolRow {
                server_id: server_id.into_inner(),
                name: tool.name().to_owned(),
                position,
                server_name: server_name.as_str().to_owned(),
                description: tool.description().to_owned(),
                input_schema: tool.input_schema().clone(),
                created_at,
            })
        })
        .collect()
}

fn to_health_row(record: &HealthRecord) -> ToolRegistryStoreResult<HealthRow> {
    let latency_ms = record
        .latency_ms
        .map(i64::try_from)
        .transpose()
        .map_err(ToolRegistryStoreError::persistence)?;
    let consecutive_failures = i32::try_from(record.consecutive_failures)
        .map_err(ToolRegistryStoreError::persistence)?;

    Ok(HealthRow {
        server_id: record.server_id.into_inner(),
        status: record.status.as_str().to_owned(),
        latency_ms,
        consecutive_failures,
        last_checked_at: record.last_checked_at,
        last_success_at: record.last_success_at,
        last_error: record.last_error.clone(),
    })
}

fn row_to_health(row: HealthRow) -> ToolRegistryStoreResult<HealthRecord> {
    let status = HealthStatus::try_from(row.status.as_str())
        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let latency_ms = row
        .latency_ms
        .map(u64::try_from)
        .transpose()
        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;
    let consecutive_failures = u32::try_from(row.consecutive_failures)
        .map_err(ToolRegistryStoreError::invalid_persisted_data)?;

    Ok(HealthRecord {
        server_id: ServerId::from_uuid(row.server_id),
        status,
        latency_ms,
        consecutive_failures,
        last_checked_at: row.last_checked_at,
        last_success_at: row.last_success_at,
        last_error: row.last_error,
    })
}
