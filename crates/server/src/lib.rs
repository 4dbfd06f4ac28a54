//! Collaboration server.
//!
//! Each open document is a [`Session`] that orders incoming operations,
//! transforms late ones past what their authors had not seen, and relays the
//! results. A [`SessionRegistry`] holds every session and is owned by a
//! single actor task ([`RegistryService`]); connection tasks reach it through
//! a [`RegistryHandle`].

#![warn(missing_docs)]

/// TOML configuration.
pub mod config;
/// Error types.
pub mod error;
/// Document sessions keyed by id.
pub mod registry;
/// Registry actor and its handle.
pub mod service;
/// Per-document ordering and fan-out.
pub mod session;
/// TCP front end.
pub mod transport;

pub use config::ServerConfig;
pub use error::{ConfigError, ServerError, SessionError};
pub use registry::SessionRegistry;
pub use service::{RegistryHandle, RegistryService, SessionSnapshot};
pub use session::{Delivery, Session};
pub use transport::serve;
