//! Driver registry - builds the configured driver.
//!
//! When adding a new driver:
//! 1. Create the driver file in `definitions/`
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its discriminator here in `build_driver()` and `driver_names()`

use std::sync::Arc;
use tracing::info;

use super::Driver;
use super::definitions::FileDriver;
use crate::core::config::DriverSettings;
use crate::core::error::{Error, Result};

/// Construct the driver selected by `settings.driver`.
///
/// Fails when the discriminator is unknown, when the selected driver's
/// settings block is missing, or when the driver itself cannot be built.
pub async fn build_driver(settings: &DriverSettings) -> Result<Arc<dyn Driver>> {
    let driver: Arc<dyn Driver> = match settings.driver.as_str() {
        FileDriver::NAME => {
            let config = settings
                .file
                .as_ref()
                .ok_or_else(|| missing_block(FileDriver::NAME, "file"))?;
            info!("Serving resources from {}", config.directory.display());
            Arc::new(FileDriver::new(config))
        }

        #[cfg(feature = "ldap")]
        super::definitions::LdapDriver::NAME => {
            use super::definitions::LdapDriver;

            let config = settings
                .ldap
                .clone()
                .ok_or_else(|| missing_block(LdapDriver::NAME, "ldap"))?;
            info!("Resolving against directory {}", config.url);
            Arc::new(LdapDriver::new(config, settings.identifier.clone())?)
        }

        #[cfg(feature = "sql")]
        super::definitions::SqlDriver::NAME => {
            use super::definitions::SqlDriver;

            let config = settings
                .database
                .clone()
                .ok_or_else(|| missing_block(SqlDriver::NAME, "database"))?;
            Arc::new(SqlDriver::connect(config, settings.identifier.clone()).await?)
        }

        #[cfg(not(feature = "ldap"))]
        "ldap" => return Err(not_compiled("ldap")),

        #[cfg(not(feature = "sql"))]
        "sql" => return Err(not_compiled("sql")),

        other => return Err(Error::config(format!("driver `{other}` is invalid"))),
    };

    Ok(driver)
}

fn missing_block(driver: &str, block: &str) -> Error {
    Error::config(format!(
        "driver `{driver}` selected but the `{block}` block is missing"
    ))
}

#[cfg(any(not(feature = "ldap"), not(feature = "sql")))]
fn not_compiled(driver: &str) -> Error {
    Error::config(format!("driver `{driver}` is not compiled into this build"))
}

/// Discriminators of every driver compiled into this build.
pub fn driver_names() -> Vec<&'static str> {
    let mut names = vec![FileDriver::NAME];
    #[cfg(feature = "ldap")]
    names.push(super::definitions::LdapDriver::NAME);
    #[cfg(feature = "sql")]
    names.push(super::definitions::SqlDriver::NAME);
    names
}
