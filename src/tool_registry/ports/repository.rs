//! Storage port for tool server configs, tool sets, health, credentials, and
//! global configuration.

use crate::tool_registry::domain::{
    CredentialKey, EncryptedSecret, GlobalConfig, GlobalConfigPatch, HealthRecord,
    NewServerConfig, Page, PageRequest, ServerConfig, ServerConfigUpdate, ServerId, ServerName,
    ToolDefinition, ToolManifest, ToolRegistryDomainError,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tool registry storage operations.
pub type ToolRegistryStoreResult<T> = Result<T, ToolRegistryStoreError>;

/// Durable storage contract behind the tool registry.
///
/// Single-statement operations surface storage failures unchanged.
/// [`save_tools`](Self::save_tools) and [`set_config`](Self::set_config) are
/// all-or-nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolRegistryStore: Send + Sync {
    /// Inserts a new server configuration and returns the stored record,
    /// including its generated identifier and timestamps.
    ///
    /// Duplicate names are accepted.
    async fn add_server(&self, input: NewServerConfig) -> ToolRegistryStoreResult<ServerConfig>;

    /// Finds a server by identifier.
    async fn get_server(&self, server_id: ServerId)
    -> ToolRegistryStoreResult<Option<ServerConfig>>;

    /// Finds a server by display name.
    async fn find_server_by_name(
        &self,
        server_name: &ServerName,
    ) -> ToolRegistryStoreResult<Option<ServerConfig>>;

    /// Returns one page of servers, oldest first, with the total count.
    async fn list_servers(&self, page: PageRequest)
    -> ToolRegistryStoreResult<Page<ServerConfig>>;

    /// Applies a partial update.
    ///
    /// Returns `false` without touching storage when `update` is empty, and
    /// `false` when no server has the identifier.
    async fn update_server(
        &self,
        server_id: ServerId,
        update: &ServerConfigUpdate,
    ) -> ToolRegistryStoreResult<bool>;

    /// Deletes a server configuration, returning whether a record was
    /// removed. Tools, health, and credentials are left in place.
    async fn delete_server(&self, server_id: ServerId) -> ToolRegistryStoreResult<bool>;

    /// Replaces the persisted tool set of a server in one transaction.
    ///
    /// An empty `tools` slice clears the set. On failure the previous set is
    /// kept intact.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryStoreError::InvalidInput`] when two tools share a
    /// name; nothing is written in that case.
    async fn save_tools(
        &self,
        server_id: ServerId,
        server_name: &ServerName,
        tools: &[ToolManifest],
    ) -> ToolRegistryStoreResult<()>;

    /// Loads the persisted tool set of a server, annotated with the server's
    /// current name. Unknown servers yield an empty list.
    async fn load_tools(&self, server_id: ServerId)
    -> ToolRegistryStoreResult<Vec<ToolDefinition>>;

    /// Deletes every persisted tool of a server, returning the number of rows
    /// removed. Deleting nothing is not an error.
    async fn delete_tools(&self, server_id: ServerId) -> ToolRegistryStoreResult<usize>;

    /// Returns stored settings merged onto the defaults.
    async fn get_config(&self) -> ToolRegistryStoreResult<GlobalConfig>;

    /// Upserts every defined entry of `patch` in one transaction, then
    /// returns the merged configuration. An empty patch writes nothing.
    async fn set_config(&self, patch: &GlobalConfigPatch)
    -> ToolRegistryStoreResult<GlobalConfig>;

    /// Upserts the health record of its server.
    async fn save_health(&self, record: &HealthRecord) -> ToolRegistryStoreResult<()>;

    /// Returns the health record of a server.
    async fn get_health(&self, server_id: ServerId)
    -> ToolRegistryStoreResult<Option<HealthRecord>>;

    /// Returns every stored health record.
    async fn get_all_health(&self) -> ToolRegistryStoreResult<Vec<HealthRecord>>;

    /// Upserts a caller-encrypted credential.
    async fn save_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
        value: &EncryptedSecret,
    ) -> ToolRegistryStoreResult<()>;

    /// Returns a stored credential.
    async fn get_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<Option<EncryptedSecret>>;

    /// Returns the credential keys of a server in sorted order.
    async fn list_credential_keys(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Vec<CredentialKey>>;

    /// Deletes a credential, returning whether a record was removed.
    async fn delete_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<bool>;
}

/// Errors returned by tool registry storage implementations.
#[derive(Debug, Clone, Error)]
pub enum ToolRegistryStoreError {
    /// The request was rejected before anything was written.
    #[error("invalid tool registry input: {0}")]
    InvalidInput(#[from] ToolRegistryDomainError),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted tool registry data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolRegistryStoreError {
    /// Wraps persisted-data decoding or validation failures.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence-layer failure.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for ToolRegistryStoreError {
    fn from(err: diesel::result::Error) -> Self {
        Self::persistence(err)
    }
}
