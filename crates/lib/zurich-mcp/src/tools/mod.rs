//! MCP tool modules.
//!
//! Tools are grouped by backend: the open data catalog and its datastore,
//! realtime datastore feeds, the geoportal, the council records, tourism
//! and linked data, plus contextual help.

pub mod catalog;
pub mod geo;
pub mod linked;
pub mod parliament;
pub mod realtime;
pub mod tourism;
mod context;
