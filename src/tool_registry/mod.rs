//! Tool server registry and dispatch core.
//!
//! Registers tool server configurations, persists the tool sets they
//! advertise, serves tool discovery from a per-server cache, and routes tool
//! calls to the owning server. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
