//! In-memory storage for tool servers, tool sets, health, credentials, and
//! global configuration.

use crate::tool_registry::{
    domain::{
        CredentialKey, EncryptedSecret, GlobalConfig, GlobalConfigPatch, HealthRecord,
        NewServerConfig, Page, PageRequest, ServerConfig, ServerConfigUpdate, ServerId,
        ServerName, ToolDefinition, ToolManifest, ensure_unique_tool_names,
    },
    ports::{ToolRegistryStore, ToolRegistryStoreError, ToolRegistryStoreResult},
};
use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Thread-safe in-memory tool registry store.
///
/// Every operation holds the state lock for its whole duration, so tool-set
/// replacement and configuration upserts are atomic.
#[derive(Clone)]
pub struct InMemoryToolRegistryStore {
    state: Arc<RwLock<InMemoryStoreState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    servers: HashMap<ServerId, ServerConfig>,
    tools: HashMap<ServerId, Vec<ToolManifest>>,
    health: HashMap<ServerId, HealthRecord>,
    credentials: BTreeMap<(ServerId, CredentialKey), EncryptedSecret>,
    config: BTreeMap<String, Value>,
}

impl InMemoryToolRegistryStore {
    /// Creates an empty store stamped with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty store stamped with the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryStoreState::default())),
            clock,
        }
    }

    fn read(&self) -> ToolRegistryStoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state.read().map_err(|err| {
            ToolRegistryStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> ToolRegistryStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state.write().map_err(|err| {
            ToolRegistryStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

impl Default for InMemoryToolRegistryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolRegistryStore for InMemoryToolRegistryStore {
    async fn add_server(&self, input: NewServerConfig) -> ToolRegistryStoreResult<ServerConfig> {
        let server = ServerConfig::new(input, &*self.clock);
        let mut state = self.write()?;
        state.servers.insert(server.id(), server.clone());
        Ok(server)
    }

    async fn get_server(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Option<ServerConfig>> {
        Ok(self.read()?.servers.get(&server_id).cloned())
    }

    async fn find_server_by_name(
        &self,
        server_name: &ServerName,
    ) -> ToolRegistryStoreResult<Option<ServerConfig>> {
        let state = self.read()?;
        let mut matches: Vec<&ServerConfig> = state
            .servers
            .values()
            .filter(|server| server.name() == server_name)
            .collect();
        matches.sort_by_key(|server| (server.created_at(), server.id()));
        Ok(matches.first().map(|server| (*server).clone()))
    }

    async fn list_servers(
        &self,
        page: PageRequest,
    ) -> ToolRegistryStoreResult<Page<ServerConfig>> {
        let state = self.read()?;
        let mut servers: Vec<&ServerConfig> = state.servers.values().collect();
        servers.sort_by_key(|server| (server.created_at(), server.id()));

        let total = u64::try_from(servers.len()).map_err(ToolRegistryStoreError::persistence)?;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let items = servers
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(Page::new(items, total))
    }

    async fn update_server(
        &self,
        server_id: ServerId,
        update: &ServerConfigUpdate,
    ) -> ToolRegistryStoreResult<bool> {
        if update.is_empty() {
            return Ok(false);
        }

        let mut state = self.write()?;
        let Some(server) = state.servers.get_mut(&server_id) else {
            return Ok(false);
        };
        Ok(server.apply_update(update, &*self.clock))
    }

    async fn delete_server(&self, server_id: ServerId) -> ToolRegistryStoreResult<bool> {
        Ok(self.write()?.servers.remove(&server_id).is_some())
    }

    async fn save_tools(
        &self,
        server_id: ServerId,
        _server_name: &ServerName,
        tools: &[ToolManifest],
    ) -> ToolRegistryStoreResult<()> {
        ensure_unique_tool_names(tools)?;

        let mut state = self.write()?;
        if tools.is_empty() {
            state.tools.remove(&server_id);
            return Ok(());
        }
        state.tools.insert(server_id, tools.to_vec());
        Ok(())
    }

    async fn load_tools(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Vec<ToolDefinition>> {
        let state = self.read()?;
        let Some(server) = state.servers.get(&server_id) else {
            return Ok(Vec::new());
        };
        let Some(stored) = state.tools.get(&server_id) else {
            return Ok(Vec::new());
        };

        Ok(stored
            .iter()
            .cloned()
            .map(|manifest| {
                ToolDefinition::from_manifest(manifest, server.id(), server.name().clone())
            })
            .collect())
    }

    async fn delete_tools(&self, server_id: ServerId) -> ToolRegistryStoreResult<usize> {
        let removed = self.write()?.tools.remove(&server_id);
        Ok(removed.map_or(0, |stored| stored.len()))
    }

    async fn get_config(&self) -> ToolRegistryStoreResult<GlobalConfig> {
        let state = self.read()?;
        Ok(GlobalConfig::from_stored(
            state
                .config
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        ))
    }

    async fn set_config(
        &self,
        patch: &GlobalConfigPatch,
    ) -> ToolRegistryStoreResult<GlobalConfig> {
        let entries = patch.entries();
        if !entries.is_empty() {
            let mut state = self.write()?;
            for (key, value) in entries {
                state.config.insert(key.as_str().to_owned(), value);
            }
        }
        self.get_config().await
    }

    async fn save_health(&self, record: &HealthRecord) -> ToolRegistryStoreResult<()> {
        self.write()?
            .health
            .insert(record.server_id, record.clone());
        Ok(())
    }

    async fn get_health(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Option<HealthRecord>> {
        Ok(self.read()?.health.get(&server_id).cloned())
    }

    async fn get_all_health(&self) -> ToolRegistryStoreResult<Vec<HealthRecord>> {
        let state = self.read()?;
        let mut records: Vec<HealthRecord> = state.health.values().cloned().collect();
        records.sort_by_key(|record| record.server_id);
        Ok(records)
    }

    async fn save_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
        value: &EncryptedSecret,
    ) -> ToolRegistryStoreResult<()> {
        self.write()?
            .credentials
            .insert((server_id, key.clone()), value.clone());
        Ok(())
    }

    async fn get_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<Option<EncryptedSecret>> {
        Ok(self
            .read()?
            .credentials
            .get(&(server_id, key.clone()))
            .cloned())
    }

    async fn list_credential_keys(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryStoreResult<Vec<CredentialKey>> {
        let state = self.read()?;
        Ok(state
            .credentials
            .keys()
            .filter(|(owner, _)| *owner == server_id)
            .map(|(_, key)| key.clone())
            .collect())
    }

    async fn delete_credential(
        &self,
        server_id: ServerId,
        key: &CredentialKey,
    ) -> ToolRegistryStoreResult<bool> {
        Ok(self
            .write()?
            .credentials
            .remove(&(server_id, key.clone()))
            .is_some())
    }
}
