//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the lookup
//! server, including error handling, configuration, path confinement,
//! server lifecycle management and the HTTP transport.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::{Config, DriverSettings};
pub use error::{Error, Result};
pub use security::{PathSecurityError, confine, validate_path};
pub use server::LookupServer;
pub use transport::{HttpConfig, HttpTransport};
