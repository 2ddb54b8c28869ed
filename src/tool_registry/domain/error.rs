//! Error types for tool registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing tool registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// The server name is empty after trimming.
    #[error("MCP server name must not be empty")]
    EmptyServerName,

    /// The server name exceeds the 100-character storage limit.
    #[error("MCP server name exceeds 100 character limit: {0}")]
    ServerNameTooLong(String),

    /// The STDIO command is empty.
    #[error("STDIO command must not be empty")]
    EmptyStdioCommand,

    /// A network transport URL is empty.
    #[error("{kind} URL must not be empty")]
    EmptyTransportUrl {
        /// Transport kind in canonical string form.
        kind: &'static str,
    },

    /// A network transport URL does not have an `http://` or `https://` prefix.
    #[error("{kind} URL '{url}' must start with 'http://' or 'https://'")]
    InvalidTransportUrl {
        /// Transport kind in canonical string form.
        kind: &'static str,
        /// Rejected URL.
        url: String,
    },

    /// A tool manifest name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// A tool set contains the same tool name more than once.
    #[error("duplicate tool name '{0}' in tool set")]
    DuplicateToolName(String),

    /// A credential key is not a valid environment variable name.
    #[error("credential key '{0}' is not a valid environment variable name")]
    InvalidCredentialKey(String),

    /// A credential key exceeds the 255-character storage limit.
    #[error("credential key exceeds 255 character limit: {0}")]
    CredentialKeyTooLong(String),

    /// A list page size of zero was requested.
    #[error("page limit must be greater than zero")]
    ZeroPageLimit,
}

/// Error returned while parsing a transport kind from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown MCP transport kind: {0}")]
pub struct ParseTransportKindError(pub String);

/// Error returned while parsing health status from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown MCP server health status: {0}")]
pub struct ParseHealthStatusError(pub String);
