//! Remote transport port that performs tool invocations.

use crate::tool_registry::domain::{ServerEnv, ServerId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Result type for remote tool invocations.
pub type ToolTransportResult<T> = Result<T, ToolTransportError>;

/// One tool invocation routed to a server.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Target server.
    pub server_id: ServerId,
    /// Tool name within the server.
    pub tool_name: String,
    /// Tool arguments, passed through unmodified.
    pub arguments: Value,
    /// Environment with credentials already resolved.
    pub env: ServerEnv,
}

/// Performs tool calls against remote tool servers.
///
/// Timeouts are the transport's responsibility.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Invokes a tool and returns its result document.
    async fn invoke(&self, invocation: ToolInvocation) -> ToolTransportResult<Value>;
}

/// Errors returned by transport adapters.
#[derive(Debug, Clone, Error)]
pub enum ToolTransportError {
    /// The server does not expose the requested tool.
    #[error("tool '{tool_name}' not found on MCP server {server_id}")]
    ToolNotFound {
        /// Server identifier.
        server_id: ServerId,
        /// Requested tool name.
        tool_name: String,
    },

    /// The invocation did not finish in time.
    #[error("tool '{tool_name}' on MCP server {server_id} timed out")]
    Timeout {
        /// Server identifier.
        server_id: ServerId,
        /// Requested tool name.
        tool_name: String,
    },

    /// The server answered with an error.
    #[error("tool '{tool_name}' failed: {message}")]
    ToolFailed {
        /// Requested tool name.
        tool_name: String,
        /// Error message reported by the server.
        message: String,
    },

    /// Generic transport failure.
    #[error("MCP transport error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl ToolTransportError {
    /// Wraps a runtime error from the transport adapter.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
