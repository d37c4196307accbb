//! Error types and handling for the lookup server.
//!
//! This module defines the error type for everything that can go wrong
//! while loading settings and constructing the driver. Lookup failures are
//! reported per request as `DriverError` and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

use crate::domains::drivers::{BoxError, TemplateError};

/// A specialized Result type for server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the lookup server.
#[derive(Debug, Error)]
pub enum Error {
    /// A driver template could not be loaded.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// A backend could not be reached while constructing its driver.
    #[error("Cannot connect to {driver} backend: {source}")]
    Connect {
        driver: &'static str,
        #[source]
        source: BoxError,
    },

    /// The driver settings file could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new backend connection error.
    pub fn connect(driver: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Connect {
            driver,
            source: source.into(),
        }
    }
}
