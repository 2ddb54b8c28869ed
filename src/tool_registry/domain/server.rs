//! Tool server configuration aggregate root.

use super::{ServerId, ServerName, ServerTransport, ToolRegistryDomainError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Declared environment of a server: variable names mapped to placeholder or
/// default values. Secrets are never stored here.
pub type ServerEnv = BTreeMap<String, String>;

/// Input for adding a tool server.
///
/// Omitted optional fields default to an empty environment and
/// `enabled = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewServerConfig {
    /// Display name.
    pub name: ServerName,
    /// Transport descriptor.
    pub transport: ServerTransport,
    /// Declared environment placeholders.
    pub env: ServerEnv,
    /// Whether discovery and dispatch are allowed.
    pub enabled: bool,
}

impl NewServerConfig {
    /// Creates an enabled server input with an empty environment.
    #[must_use]
    pub const fn new(name: ServerName, transport: ServerTransport) -> Self {
        Self {
            name,
            transport,
            env: BTreeMap::new(),
            enabled: true,
        }
    }

    /// Creates an input for the default `stdio` transport with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when the name or command is invalid.
    pub fn stdio(
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::new(
            ServerName::new(name)?,
            ServerTransport::stdio(command)?,
        ))
    }

    /// Replaces the declared environment.
    #[must_use]
    pub fn with_env<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = values
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Partial update of a server configuration; `None` fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfigUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<ServerName>,
    /// New transport descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<ServerTransport>,
    /// New declared environment, replacing the old one entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<ServerEnv>,
    /// New enabled flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ServerConfigUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new display name.
    #[must_use]
    pub fn with_name(mut self, name: ServerName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets a new transport descriptor.
    #[must_use]
    pub fn with_transport(mut self, transport: ServerTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets a new declared environment.
    #[must_use]
    pub fn with_env(mut self, env: ServerEnv) -> Self {
        self.env = Some(env);
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Returns whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.transport.is_none()
            && self.env.is_none()
            && self.enabled.is_none()
    }
}

/// Configuration of one remote tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    id: ServerId,
    name: ServerName,
    transport: ServerTransport,
    env: ServerEnv,
    enabled: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing persisted server state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedServerConfigData {
    /// Persisted server identifier.
    pub id: ServerId,
    /// Persisted display name.
    pub name: ServerName,
    /// Persisted transport descriptor.
    pub transport: ServerTransport,
    /// Persisted declared environment.
    pub env: ServerEnv,
    /// Persisted enabled flag.
    pub enabled: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl ServerConfig {
    /// Creates a server configuration with a fresh identifier.
    #[must_use]
    pub fn new(input: NewServerConfig, clock: &(impl Clock + ?Sized)) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ServerId::new(),
            name: input.name,
            transport: input.transport,
            env: input.env,
            enabled: input.enabled,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a server configuration from persistence.
    #[must_use]
    pub fn from_persisted(data: PersistedServerConfigData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            transport: data.transport,
            env: data.env,
            enabled: data.enabled,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub const fn name(&self) -> &ServerName {
        &self.name
    }

    /// Returns the transport descriptor.
    #[must_use]
    pub const fn transport(&self) -> &ServerTransport {
        &self.transport
    }

    /// Returns the declared environment.
    #[must_use]
    pub const fn env(&self) -> &ServerEnv {
        &self.env
    }

    /// Returns whether discovery and dispatch are allowed.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the creation timestamp in epoch milliseconds.
    #[must_use]
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.timestamp_millis()
    }

    /// Returns the latest update timestamp in epoch milliseconds.
    #[must_use]
    pub fn updated_at_millis(&self) -> i64 {
        self.updated_at.timestamp_millis()
    }

    /// Applies a partial update.
    ///
    /// Returns `false` without touching the record when the update is empty.
    pub fn apply_update(
        &mut self,
        update: &ServerConfigUpdate,
        clock: &(impl Clock + ?Sized),
    ) -> bool {
        if update.is_empty() {
            return false;
        }

        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(transport) = &update.transport {
            self.transport = transport.clone();
        }
        if let Some(env) = &update.env {
            self.env = env.clone();
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        self.updated_at = clock.utc();
        true
    }
}
