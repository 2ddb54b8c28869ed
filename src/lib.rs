//! Switchboard: tool server registry and dispatch core.
//!
//! This crate keeps track of tool servers speaking the Model Context
//! Protocol, persists the tool sets they advertise, serves tool discovery
//! from a per-server cache, and routes tool calls to the owning server.
//!
//! # Architecture
//!
//! Switchboard follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage, credentials, and
//!   transport
//! - **Adapters**: Concrete implementations of ports (in-memory, `PostgreSQL`)
//!
//! # Modules
//!
//! - [`tool_registry`]: Server configuration, tool discovery, and dispatch
//! - [`config`]: Storage settings read from the environment
//! - [`logging`]: `tracing` subscriber setup

pub mod config;
pub mod logging;
pub mod tool_registry;
