//! Tool registry manager: per-server tool cache, discovery, and dispatch.

use crate::tool_registry::{
    domain::{
        PageRequest, ResourceDefinition, ServerConfig, ServerId, ServerName, ToolDefinition,
        ToolManifest, ToolRegistryDomainError, ensure_unique_tool_names,
    },
    ports::{
        CredentialInjectionError, CredentialInjector, ToolInvocation, ToolRegistryStore,
        ToolRegistryStoreError, ToolTransport, ToolTransportError,
    },
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for tool discovery and dispatch.
#[derive(Debug, Error)]
pub enum ToolRegistryServiceError {
    /// Tool manifests failed validation.
    #[error(transparent)]
    Domain(#[from] ToolRegistryDomainError),
    /// Storage operation failed.
    #[error(transparent)]
    Store(#[from] ToolRegistryStoreError),
    /// Credential resolution failed.
    #[error(transparent)]
    Credentials(#[from] CredentialInjectionError),
    /// The transport reported a failure.
    #[error(transparent)]
    Transport(#[from] ToolTransportError),
    /// No enabled server has the given identifier.
    #[error("MCP server {0} not found or disabled")]
    ServerUnavailable(ServerId),
}

/// Result type for tool registry service operations.
pub type ToolRegistryServiceResult<T> = Result<T, ToolRegistryServiceError>;

/// Outcome of [`ToolRegistryManager::refresh_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Servers listed from storage.
    pub servers_seen: usize,
    /// Enabled servers whose tools and resources were discovered.
    pub servers_refreshed: usize,
    /// Tools returned by discovery across refreshed servers.
    pub tools_discovered: usize,
}

type ToolCache = HashMap<ServerId, Vec<ToolDefinition>>;
type ResourceCache = HashMap<ServerId, Vec<ResourceDefinition>>;

/// Owns the tool cache and routes tool calls to servers.
///
/// Discovery falls back to storage only on a cache miss. Missing and disabled
/// servers yield empty discovery results but make
/// [`call_tool`](Self::call_tool) fail.
pub struct ToolRegistryManager<S, T>
where
    S: ToolRegistryStore,
    T: ToolTransport,
{
    store: Arc<S>,
    transport: Arc<T>,
    credentials: Option<Arc<dyn CredentialInjector>>,
    tools: RwLock<ToolCache>,
    resources: RwLock<ResourceCache>,
}

impl<S, T> ToolRegistryManager<S, T>
where
    S: ToolRegistryStore,
    T: ToolTransport,
{
    /// Creates a manager with an empty cache and no credential injector.
    #[must_use]
    pub fn new(store: Arc<S>, transport: Arc<T>) -> Self {
        Self {
            store,
            transport,
            credentials: None,
            tools: RwLock::new(HashMap::new()),
            resources: RwLock::new(HashMap::new()),
        }
    }

    /// Resolves server environments through `injector` before each call.
    #[must_use]
    pub fn with_credential_injector(mut self, injector: Arc<dyn CredentialInjector>) -> Self {
        self.credentials = Some(injector);
        self
    }

    /// Returns the backing store for administrative operations.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns identifiers of servers with cached tools, in sorted order.
    #[must_use]
    pub fn cached_server_ids(&self) -> Vec<ServerId> {
        let cache = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<ServerId> = cache.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Replaces the cached and persisted tool set of a server.
    ///
    /// `server_name` is copied onto every tool; later renames are not
    /// reflected until the set is registered or restored again.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryServiceError::Domain`] when two manifests share a
    /// name, or store errors when persisting fails.
    pub async fn register_tools(
        &self,
        server_id: ServerId,
        server_name: &ServerName,
        manifests: Vec<ToolManifest>,
    ) -> ToolRegistryServiceResult<Vec<ToolDefinition>> {
        ensure_unique_tool_names(&manifests)?;

        let definitions: Vec<ToolDefinition> = manifests
            .iter()
            .cloned()
            .map(|manifest| ToolDefinition::from_manifest(manifest, server_id, server_name.clone()))
            .collect();
        self.replace_cached(server_id, definitions.clone());

        self.store
            .save_tools(server_id, server_name, &manifests)
            .await?;
        info!(
            server_id = %server_id,
            tool_count = definitions.len(),
            "registered tools"
        );
        Ok(definitions)
    }

    /// Returns the tools of an enabled server.
    ///
    /// A non-empty cache entry is returned as-is; otherwise the persisted set
    /// is loaded and cached. A registration that lands while storage is being
    /// read wins over the loaded set.
    ///
    /// # Errors
    ///
    /// Returns store errors from the server lookup or the tool load.
    pub async fn discover_tools(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryServiceResult<Vec<ToolDefinition>> {
        if self.enabled_server(server_id).await?.is_none() {
            return Ok(Vec::new());
        }

        if let Some(cached) = self.cached_tools(server_id) {
            debug!(server_id = %server_id, tool_count = cached.len(), "tool cache hit");
            return Ok(cached);
        }

        let loaded = self.store.load_tools(server_id).await?;
        if loaded.is_empty() {
            return Ok(Vec::new());
        }
        debug!(server_id = %server_id, tool_count = loaded.len(), "tools loaded from storage");
        Ok(self.cache_if_cold(server_id, loaded))
    }

    /// Reloads a server's tools from storage into the cache.
    ///
    /// An empty persisted set removes the cache entry.
    ///
    /// # Errors
    ///
    /// Returns store errors from the tool load.
    pub async fn restore_tools(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryServiceResult<Vec<ToolDefinition>> {
        let loaded = self.store.load_tools(server_id).await?;
        info!(server_id = %server_id, tool_count = loaded.len(), "restored tools");
        self.replace_cached(server_id, loaded.clone());
        Ok(loaded)
    }

    /// Returns the resources of an enabled server.
    ///
    /// Resource discovery is not wired to any transport yet, so enabled
    /// servers report whatever the resource cache holds, which is nothing.
    ///
    /// # Errors
    ///
    /// Returns store errors from the server lookup.
    pub async fn discover_resources(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryServiceResult<Vec<ResourceDefinition>> {
        if self.enabled_server(server_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let cache = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cache.get(&server_id).cloned().unwrap_or_default())
    }

    /// Returns every cached tool across servers.
    #[must_use]
    pub fn get_all_tools(&self) -> Vec<ToolDefinition> {
        let cache = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        cache.values().flatten().cloned().collect()
    }

    /// Returns every cached resource across servers.
    #[must_use]
    pub fn get_all_resources(&self) -> Vec<ResourceDefinition> {
        let cache = self.resources.read().unwrap_or_else(PoisonError::into_inner);
        cache.values().flatten().cloned().collect()
    }

    /// Drops a server's cache entries. Persisted tools are kept.
    pub fn clear_tools(&self, server_id: ServerId) {
        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&server_id);
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&server_id);
        debug!(server_id = %server_id, "cleared cached tools");
    }

    /// Drops a server's cache entries and deletes its persisted tools,
    /// returning the number of persisted tools removed.
    ///
    /// # Errors
    ///
    /// Returns store errors from the delete.
    pub async fn delete_tools(&self, server_id: ServerId) -> ToolRegistryServiceResult<usize> {
        self.clear_tools(server_id);
        let deleted = self.store.delete_tools(server_id).await?;
        info!(server_id = %server_id, deleted, "deleted persisted tools");
        Ok(deleted)
    }

    /// Invokes a tool on an enabled server.
    ///
    /// The server's declared environment is resolved through the credential
    /// injector when one is configured. The transport result is returned
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryServiceError::ServerUnavailable`] when the server
    /// is missing or disabled, and propagates store, credential, and
    /// transport failures.
    pub async fn call_tool(
        &self,
        server_id: ServerId,
        tool_name: &str,
        arguments: Value,
    ) -> ToolRegistryServiceResult<Value> {
        let server = self
            .enabled_server(server_id)
            .await?
            .ok_or(ToolRegistryServiceError::ServerUnavailable(server_id))?;

        let env = match &self.credentials {
            Some(injector) => injector.inject_credentials(server_id, server.env()).await?,
            None => server.env().clone(),
        };

        debug!(server_id = %server_id, tool_name, "dispatching tool call");
        let result = self
            .transport
            .invoke(ToolInvocation {
                server_id,
                tool_name: tool_name.to_owned(),
                arguments,
                env,
            })
            .await?;
        Ok(result)
    }

    /// Runs tool and resource discovery for every enabled server.
    ///
    /// # Errors
    ///
    /// Returns the first store error encountered; servers processed before
    /// the failure keep their refreshed cache entries.
    pub async fn refresh_all(&self) -> ToolRegistryServiceResult<RefreshSummary> {
        let mut summary = RefreshSummary::default();
        let mut page = PageRequest::default();

        loop {
            let listed = self.store.list_servers(page).await?;
            let listed_count = listed.items.len();

            for server in listed.items {
                summary.servers_seen += 1;
                if !server.is_enabled() {
                    continue;
                }
                let tools = self.discover_tools(server.id()).await?;
                self.discover_resources(server.id()).await?;
                summary.servers_refreshed += 1;
                summary.tools_discovered += tools.len();
            }

            let next = page.next();
            if listed_count == 0 || next.offset() >= listed.total {
                break;
            }
            page = next;
        }

        info!(
            servers_seen = summary.servers_seen,
            servers_refreshed = summary.servers_refreshed,
            tools_discovered = summary.tools_discovered,
            "refreshed tool registry"
        );
        Ok(summary)
    }

    async fn enabled_server(
        &self,
        server_id: ServerId,
    ) -> ToolRegistryServiceResult<Option<ServerConfig>> {
        let server = self.store.get_server(server_id).await?;
        Ok(server.filter(ServerConfig::is_enabled))
    }

    fn cached_tools(&self, server_id: ServerId) -> Option<Vec<ToolDefinition>> {
        let cache = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(&server_id)
            .filter(|tools| !tools.is_empty())
            .cloned()
    }

    /// Caches `loaded` unless the entry was filled while storage was being
    /// read, and returns whatever the entry then holds.
    fn cache_if_cold(
        &self,
        server_id: ServerId,
        loaded: Vec<ToolDefinition>,
    ) -> Vec<ToolDefinition> {
        let mut cache = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        let entry = cache.entry(server_id).or_default();
        if entry.is_empty() {
            *entry = loaded;
        }
        entry.clone()
    }

    fn replace_cached(&self, server_id: ServerId, definitions: Vec<ToolDefinition>) {
        let mut cache = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if definitions.is_empty() {
            cache.remove(&server_id);
        } else {
            cache.insert(server_id, definitions);
        }
    }
}
