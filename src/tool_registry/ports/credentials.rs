//! Credential injection port consumed by tool dispatch.

use crate::tool_registry::domain::{ServerEnv, ServerId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for credential injection.
pub type CredentialInjectionResult<T> = Result<T, CredentialInjectionError>;

/// Resolves a server's declared environment into the environment a tool call
/// runs with.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialInjector: Send + Sync {
    /// Returns `declared_env` with secret values substituted for the
    /// placeholders the injector knows about.
    async fn inject_credentials(
        &self,
        server_id: ServerId,
        declared_env: &ServerEnv,
    ) -> CredentialInjectionResult<ServerEnv>;
}

/// Errors returned by credential injectors.
#[derive(Debug, Clone, Error)]
pub enum CredentialInjectionError {
    /// A secret could not be decrypted or looked up.
    #[error("credential resolution failed for MCP server {server_id}: {reason}")]
    Unresolved {
        /// Server identifier.
        server_id: ServerId,
        /// Reason string.
        reason: String,
    },

    /// Generic injector failure.
    #[error("credential injector error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl CredentialInjectionError {
    /// Wraps a runtime error from the injector.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
