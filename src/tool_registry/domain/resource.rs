//! Resource descriptor exposed by a tool server.

use super::{ServerId, ServerName};
use serde::{Deserialize, Serialize};

/// Resource registered for a specific server.
///
/// Resources are neither cached nor persisted yet; resource discovery always
/// yields an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource URI as reported by the server.
    pub uri: String,
    /// Resource display name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Owning server identifier.
    pub server_id: ServerId,
    /// Server name captured at discovery time.
    pub server_name: ServerName,
}
