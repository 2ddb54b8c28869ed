//! Adapter implementations for tool registry storage, credential injection,
//! and tool transport ports.

pub mod memory;
pub mod postgres;
