//! WebFinger Resource Server Library
//!
//! This crate answers WebFinger lookups (RFC 7033): given an identifier such
//! as `acct:bob@example.com`, it resolves a JSON Resource Descriptor from a
//! pluggable backend and serves it over HTTP.
//!
//! # Architecture
//!
//! The server is organized into the following modules:
//!
//! - **core**: Core infrastructure including configuration, error handling, the lookup server and the HTTP transport
//! - **domains**: Business logic organized by bounded contexts
//!   - **resources**: The resource descriptor model and its wire codec
//!   - **drivers**: Backends resolving identifiers (flat files, LDAP, SQL)
//!
//! # Example
//!
//! ```rust,no_run
//! use fingerpost::core::{Config, HttpTransport, LookupServer};
//! use fingerpost::domains::drivers::build_driver;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let settings = config.load_driver_settings()?;
//!     let driver = build_driver(&settings).await?;
//!     let transport = HttpTransport::new(config.transport.clone());
//!     transport.run(LookupServer::new(config, driver)).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, LookupServer, Result};
