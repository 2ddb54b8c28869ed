//! Global feature configuration document.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Strategy used to pick a server when several expose the same tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoutingStrategy {
    /// First enabled server in registration order.
    #[default]
    FirstAvailable,
    /// Rotate across eligible servers.
    RoundRobin,
    /// Prefer the server with the lowest recorded latency.
    LeastLatency,
}

impl RoutingStrategy {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstAvailable => "first-available",
            Self::RoundRobin => "round-robin",
            Self::LeastLatency => "least-latency",
        }
    }
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Keys recognised in the global configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    /// `exposeGit`
    ExposeGit,
    /// `exposeFilesystem`
    ExposeFilesystem,
    /// `auditEnabled`
    AuditEnabled,
    /// `rateLimitPerMinute`
    RateLimitPerMinute,
    /// `routingStrategy`
    RoutingStrategy,
}

impl ConfigKey {
    /// Every recognised key.
    pub const ALL: [Self; 5] = [
        Self::ExposeGit,
        Self::ExposeFilesystem,
        Self::AuditEnabled,
        Self::RateLimitPerMinute,
        Self::RoutingStrategy,
    ];

    /// Returns the stored key name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExposeGit => "exposeGit",
            Self::ExposeFilesystem => "exposeFilesystem",
            Self::AuditEnabled => "auditEnabled",
            Self::RateLimitPerMinute => "rateLimitPerMinute",
            Self::RoutingStrategy => "routingStrategy",
        }
    }

    /// Looks up a recognised key by its stored name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Global settings merged from stored rows over built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// Whether git tooling is exposed to agents.
    pub expose_git: bool,
    /// Whether filesystem tooling is exposed to agents.
    pub expose_filesystem: bool,
    /// Whether tool calls are audited.
    pub audit_enabled: bool,
    /// Per-minute tool call budget.
    pub rate_limit_per_minute: u32,
    /// Server selection strategy.
    pub routing_strategy: RoutingStrategy,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            expose_git: false,
            expose_filesystem: false,
            audit_enabled: true,
            rate_limit_per_minute: 60,
            routing_strategy: RoutingStrategy::FirstAvailable,
        }
    }
}

impl GlobalConfig {
    /// Merges stored key/value rows onto the defaults.
    ///
    /// Unknown keys are ignored. A value that does not match its key's type
    /// leaves the default in place.
    #[must_use]
    pub fn from_stored<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut config = Self::default();
        for (name, value) in rows {
            let Some(key) = ConfigKey::parse(&name) else {
                debug!(key = %name, "ignoring unrecognised config key");
                continue;
            };
            if let Err(err) = config.apply(key, value) {
                warn!(key = %key, error = %err, "ignoring malformed config value");
            }
        }
        config
    }

    fn apply(&mut self, key: ConfigKey, value: Value) -> Result<(), serde_json::Error> {
        match key {
            ConfigKey::ExposeGit => self.expose_git = serde_json::from_value(value)?,
            ConfigKey::ExposeFilesystem => self.expose_filesystem = serde_json::from_value(value)?,
            ConfigKey::AuditEnabled => self.audit_enabled = serde_json::from_value(value)?,
            ConfigKey::RateLimitPerMinute => {
                self.rate_limit_per_minute = serde_json::from_value(value)?;
            }
            ConfigKey::RoutingStrategy => self.routing_strategy = serde_json::from_value(value)?,
        }
        Ok(())
    }
}

/// Partial global configuration; `None` entries are not written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfigPatch {
    /// New `exposeGit` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_git: Option<bool>,
    /// New `exposeFilesystem` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_filesystem: Option<bool>,
    /// New `auditEnabled` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_enabled: Option<bool>,
    /// New `rateLimitPerMinute` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_minute: Option<u32>,
    /// New `routingStrategy` value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_strategy: Option<RoutingStrategy>,
}

impl GlobalConfigPatch {
    /// Returns the defined entries in stored form.
    #[must_use]
    pub fn entries(&self) -> Vec<(ConfigKey, Value)> {
        let candidates = [
            (ConfigKey::ExposeGit, self.expose_git.map(Value::from)),
            (
                ConfigKey::ExposeFilesystem,
                self.expose_filesystem.map(Value::from),
            ),
            (ConfigKey::AuditEnabled, self.audit_enabled.map(Value::from)),
            (
                ConfigKey::RateLimitPerMinute,
                self.rate_limit_per_minute.map(Value::from),
            ),
            (
                ConfigKey::RoutingStrategy,
                self.routing_strategy
                    .map(|strategy| Value::from(strategy.as_str())),
            ),
        ];
        candidates
            .into_iter()
            .filter_map(|(key, value)| value.map(|defined| (key, defined)))
            .collect()
    }

    /// Returns whether no entry is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
