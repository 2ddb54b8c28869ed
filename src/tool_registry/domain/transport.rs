//! Tool server transport descriptor value objects.

use super::{ParseTransportKindError, ToolRegistryDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of transport kinds a tool server can be reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Local process spawned with STDIO pipes.
    #[default]
    Stdio,
    /// HTTP with server-sent events.
    Sse,
    /// Streamable HTTP.
    StreamableHttp,
}

impl TransportKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamable-http",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TransportKind {
    type Error = ParseTransportKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamable-http" | "streamable_http" => Ok(Self::StreamableHttp),
            _ => Err(ParseTransportKindError(value.to_owned())),
        }
    }
}

/// Launch settings for a tool server hosted over STDIO.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioTransport {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

impl StdioTransport {
    /// Creates a STDIO transport with no arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyStdioCommand`] when `command`
    /// is empty after trimming.
    pub fn new(command: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let normalized_command = command.into().trim().to_owned();
        if normalized_command.is_empty() {
            return Err(ToolRegistryDomainError::EmptyStdioCommand);
        }

        Ok(Self {
            command: normalized_command,
            args: Vec::new(),
        })
    }

    /// Replaces the command-line arguments.
    #[must_use]
    pub fn with_args<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = values.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the executable command.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns command-line arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Endpoint settings for a tool server reached over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTransport {
    url: String,
}

impl NetworkTransport {
    fn new(kind: TransportKind, url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        let normalized_url = url.into().trim().to_owned();
        if normalized_url.is_empty() {
            return Err(ToolRegistryDomainError::EmptyTransportUrl {
                kind: kind.as_str(),
            });
        }

        let has_valid_prefix =
            normalized_url.starts_with("http://") || normalized_url.starts_with("https://");
        if !has_valid_prefix {
            return Err(ToolRegistryDomainError::InvalidTransportUrl {
                kind: kind.as_str(),
                url: normalized_url,
            });
        }

        Ok(Self {
            url: normalized_url,
        })
    }

    /// Returns the endpoint URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Transport descriptor of a tool server.
///
/// Exactly one branch of kind-specific settings exists per transport kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "config")]
pub enum ServerTransport {
    /// Process spawned with STDIO pipes.
    Stdio(StdioTransport),
    /// HTTP with server-sent events.
    Sse(NetworkTransport),
    /// Streamable HTTP.
    StreamableHttp(NetworkTransport),
}

impl ServerTransport {
    /// Creates a `stdio` transport.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`StdioTransport::new`].
    pub fn stdio(command: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Stdio(StdioTransport::new(command)?))
    }

    /// Creates an `sse` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when `url` is empty or not HTTP(S).
    pub fn sse(url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::Sse(NetworkTransport::new(TransportKind::Sse, url)?))
    }

    /// Creates a `streamable-http` transport.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when `url` is empty or not HTTP(S).
    pub fn streamable_http(url: impl Into<String>) -> Result<Self, ToolRegistryDomainError> {
        Ok(Self::StreamableHttp(NetworkTransport::new(
            TransportKind::StreamableHttp,
            url,
        )?))
    }

    /// Rebuilds a transport from its flattened storage columns.
    ///
    /// Fields belonging to the other branch are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError`] when the populated branch fails
    /// validation.
    pub fn from_parts(
        kind: TransportKind,
        command: Option<String>,
        args: Vec<String>,
        url: Option<String>,
    ) -> Result<Self, ToolRegistryDomainError> {
        match kind {
            TransportKind::Stdio => Ok(Self::Stdio(
                StdioTransport::new(command.unwrap_or_default())?.with_args(args),
            )),
            TransportKind::Sse => Self::sse(url.unwrap_or_default()),
            TransportKind::StreamableHttp => Self::streamable_http(url.unwrap_or_default()),
        }
    }

    /// Returns the transport kind.
    #[must_use]
    pub const fn kind(&self) -> TransportKind {
        match self {
            Self::Stdio(_) => TransportKind::Stdio,
            Self::Sse(_) => TransportKind::Sse,
            Self::StreamableHttp(_) => TransportKind::StreamableHttp,
        }
    }

    /// Returns the STDIO command, if this is a STDIO transport.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Stdio(stdio) => Some(stdio.command()),
            Self::Sse(_) | Self::StreamableHttp(_) => None,
        }
    }

    /// Returns STDIO arguments; network transports have none.
    #[must_use]
    pub fn args(&self) -> &[String] {
        match self {
            Self::Stdio(stdio) => stdio.args(),
            Self::Sse(_) | Self::StreamableHttp(_) => &[],
        }
    }

    /// Returns the endpoint URL, if this is a network transport.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Stdio(_) => None,
            Self::Sse(network) | Self::StreamableHttp(network) => Some(network.url()),
        }
    }
}
