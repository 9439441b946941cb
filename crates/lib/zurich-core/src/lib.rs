//! Backend access for the Zurich open data server.
//!
//! This crate owns one adapter per backend protocol (catalog action API,
//! WFS geoportal, XML council records, SPARQL, plain JSON), the shared HTTP
//! transport, the error classifier and response formatters, and the control
//! plane that composes them into domain operations.

pub mod adapters;
pub mod classify;
pub mod control;
pub mod error;
pub mod format;
pub mod transport;
pub mod xml;

pub use classify::classify;
pub use control::{ControlError, OpenDataControlPlane};
pub use error::BackendError;
pub use transport::Endpoints;
