//! Transport layer for the lookup server.
//!
//! Lookups are served over HTTP with axum. The transport owns the listener
//! and maps driver outcomes onto HTTP status codes; resolution itself is
//! delegated to the [`LookupServer`](crate::core::LookupServer).

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::{HttpTransport, WEBFINGER_PATH, router};
