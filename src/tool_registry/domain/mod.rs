//! Domain model for tool server registration, discovery, and dispatch.
//!
//! The tool registry domain models server identity and transport, tool
//! manifests scoped to a server, health snapshots, caller-encrypted
//! credentials, and the global feature configuration document.
//! Infrastructure concerns remain outside this boundary.

mod credential;
mod error;
mod health;
mod ids;
mod page;
mod resource;
mod server;
mod settings;
mod tool;
mod transport;

pub use credential::{CredentialKey, EncryptedSecret};
pub use error::{ParseHealthStatusError, ParseTransportKindError, ToolRegistryDomainError};
pub use health::{HealthRecord, HealthStatus};
pub use ids::{ServerId, ServerName};
pub use page::{DEFAULT_PAGE_LIMIT, Page, PageRequest};
pub use resource::ResourceDefinition;
pub use server::{
    NewServerConfig, PersistedServerConfigData, ServerConfig, ServerConfigUpdate, ServerEnv,
};
pub use settings::{ConfigKey, GlobalConfig, GlobalConfigPatch, RoutingStrategy};
pub use tool::{ToolDefinition, ToolManifest, ensure_unique_tool_names};
pub use transport::{NetworkTransport, ServerTransport, StdioTransport, TransportKind};
