//! Application services for tool discovery and dispatch.

mod registry;

pub use registry::{
    RefreshSummary, ToolRegistryManager, ToolRegistryServiceError, ToolRegistryServiceResult,
};
