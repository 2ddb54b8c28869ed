//! In-memory tool transport adapter for dispatch tests.

use crate::tool_registry::{
    domain::ServerId,
    ports::{ToolInvocation, ToolTransport, ToolTransportError, ToolTransportResult},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory tool transport.
///
/// Responds to invocations from canned results keyed by server and tool name,
/// and records every invocation it receives. No processes or connections are
/// opened.
#[derive(Debug, Clone, Default)]
pub struct InMemoryToolTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    responses: HashMap<(ServerId, String), CannedResponse>,
    invocations: Vec<ToolInvocation>,
}

#[derive(Debug, Clone)]
enum CannedResponse {
    Success(Value),
    Failure(String),
}

impl InMemoryToolTransport {
    /// Creates a transport with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the result returned for a tool. Existing responses are replaced.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_response(
        &self,
        server_id: ServerId,
        tool_name: impl Into<String>,
        result: Value,
    ) -> ToolTransportResult<()> {
        self.insert(server_id, tool_name.into(), CannedResponse::Success(result))
    }

    /// Makes a tool fail with the given server-reported message.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_failure(
        &self,
        server_id: ServerId,
        tool_name: impl Into<String>,
        message: impl Into<String>,
    ) -> ToolTransportResult<()> {
        self.insert(
            server_id,
            tool_name.into(),
            CannedResponse::Failure(message.into()),
        )
    }

    /// Returns every invocation received so far, oldest first.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn invocations(&self) -> ToolTransportResult<Vec<ToolInvocation>> {
        let state = self
            .state
            .read()
            .map_err(|err| ToolTransportError::runtime(std::io::Error::other(err.to_string())))?;
        Ok(state.invocations.clone())
    }

    fn insert(
        &self,
        server_id: ServerId,
        tool_name: String,
        response: CannedResponse,
    ) -> ToolTransportResult<()> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ToolTransportError::runtime(std::io::Error::other(err.to_string())))?;
        state.responses.insert((server_id, tool_name), response);
        Ok(())
    }
}

#[async_trait]
impl ToolTransport for InMemoryToolTransport {
    async fn invoke(&self, invocation: ToolInvocation) -> ToolTransportResult<Value> {
        let mut state = self
            .state
            .write()
            .map_err(|err| ToolTransportError::runtime(std::io::Error::other(err.to_string())))?;

        let response = state
            .responses
            .get(&(invocation.server_id, invocation.tool_name.clone()))
            .cloned();
        let server_id = invocation.server_id;
        let tool_name = invocation.tool_name.clone();
        state.invocations.push(invocation);

        match response {
            Some(CannedResponse::Success(result)) => Ok(result),
            Some(CannedResponse::Failure(message)) => {
                Err(ToolTransportError::ToolFailed { tool_name, message })
            }
            None => Err(ToolTransportError::ToolNotFound {
                server_id,
                tool_name,
            }),
        }
    }
}
