//! Lookup server and lifecycle management.
//!
//! `LookupServer` owns the single driver chosen at startup and is shared by
//! every request handler. It adds request-level logging around the driver
//! but no state of its own, so clones are cheap and calls never coordinate.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::config::Config;
use crate::domains::drivers::{Driver, DriverError, ErrorKind};
use crate::domains::resources::Resource;

/// The lookup server handle.
#[derive(Clone)]
pub struct LookupServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The driver resolving identifiers for this process.
    driver: Arc<dyn Driver>,
}

impl LookupServer {
    /// Create a new server around an already constructed driver.
    pub fn new(config: Config, driver: Arc<dyn Driver>) -> Self {
        Self {
            config: Arc::new(config),
            driver,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Name of the active driver.
    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Resolve an identifier through the active driver.
    #[instrument(skip(self), fields(driver = self.driver.name()))]
    pub async fn lookup(&self, identifier: &str) -> Result<Resource, DriverError> {
        info!("Received request for resource {}", identifier);

        let result = self.driver.resolve(identifier).await;
        match &result {
            Ok(resource) => debug!("Resolved {} with {} links", identifier, resource.links.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => info!("Resource {} not found", identifier),
            Err(e) => warn!("Error retrieving resource {}: {}", identifier, e),
        }

        result
    }
}
