//! In-memory adapters for tests and single-process deployments.

mod credentials;
mod repository;
mod transport;

pub use credentials::InMemoryCredentialInjector;
pub use repository::InMemoryToolRegistryStore;
pub use transport::InMemoryToolTransport;
