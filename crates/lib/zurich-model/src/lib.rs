//! Wire models and lookup registries for the Zurich open data backends.
//!
//! This crate defines the decoded shapes shared by the adapters, the control
//! plane, and the MCP tool shell.

pub mod models;
pub mod registry;

pub use models::*;
