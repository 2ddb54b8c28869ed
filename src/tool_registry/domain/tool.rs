//! Tool manifest and server-scoped tool definition value objects.

use super::{ServerId, ServerName, ToolRegistryDomainError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashSet;

/// Tool description as self-reported by a tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawToolManifest")]
pub struct ToolManifest {
    name: String,
    description: String,
    input_schema: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToolManifest {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    input_schema: Option<Value>,
}

impl TryFrom<RawToolManifest> for ToolManifest {
    type Error = ToolRegistryDomainError;

    fn try_from(raw: RawToolManifest) -> Result<Self, Self::Error> {
        Self::new(
            raw.name,
            raw.description.unwrap_or_default(),
            raw.input_schema.unwrap_or_else(empty_object_schema),
        )
    }
}

fn empty_object_schema() -> Value {
    json!({"type": "object"})
}

impl ToolManifest {
    /// Creates a tool manifest.
    ///
    /// The input schema is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyToolName`] when the trimmed
    /// name is empty.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        Ok(Self {
            name: normalized_name,
            description: description.into().trim().to_owned(),
            input_schema,
        })
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description; may be empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}

/// Checks that no tool name appears twice in a server's tool set.
///
/// # Errors
///
/// Returns [`ToolRegistryDomainError::DuplicateToolName`] naming the first
/// repeated tool.
pub fn ensure_unique_tool_names(tools: &[ToolManifest]) -> Result<(), ToolRegistryDomainError> {
    let mut seen = HashSet::with_capacity(tools.len());
    for tool in tools {
        if !seen.insert(tool.name()) {
            return Err(ToolRegistryDomainError::DuplicateToolName(
                tool.name().to_owned(),
            ));
        }
    }
    Ok(())
}

/// Tool registered for a specific server.
///
/// `server_name` is copied from the server when the tool set is registered or
/// loaded. A later rename of the server does not update it until the next
/// registration or load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Value,
    server_id: ServerId,
    server_name: ServerName,
}

impl ToolDefinition {
    /// Attaches server identity to a manifest.
    #[must_use]
    pub fn from_manifest(
        manifest: ToolManifest,
        server_id: ServerId,
        server_name: ServerName,
    ) -> Self {
        let ToolManifest {
            name,
            description,
            input_schema,
        } = manifest;
        Self {
            name,
            description,
            input_schema,
            server_id,
            server_name,
        }
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the input schema.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Returns the owning server identifier.
    #[must_use]
    pub const fn server_id(&self) -> ServerId {
        self.server_id
    }

    /// Returns the server name captured at registration or load time.
    #[must_use]
    pub const fn server_name(&self) -> &ServerName {
        &self.server_name
    }

    /// Strips server identity, yielding the original manifest.
    #[must_use]
    pub fn into_manifest(self) -> ToolManifest {
        ToolManifest {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
        }
    }
}
