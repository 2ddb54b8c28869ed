//! Port contracts for tool registry storage, credential injection, and
//! remote tool invocation.

mod credentials;
mod repository;
mod transport;

pub use credentials::{CredentialInjectionError, CredentialInjectionResult, CredentialInjector};
#[cfg(test)]
pub use credentials::MockCredentialInjector;
#[cfg(test)]
pub use repository::MockToolRegistryStore;
#[cfg(test)]
pub use transport::MockToolTransport;
pub use repository::{ToolRegistryStore, ToolRegistryStoreError, ToolRegistryStoreResult};
pub use transport::{ToolInvocation, ToolTransport, ToolTransportError, ToolTransportResult};
