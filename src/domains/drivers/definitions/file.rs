//! Flat-file driver.
//!
//! Each identifier maps to one YAML document under the base directory,
//! named after the identifier itself (`acct:bob@example.com`). The document
//! is decoded directly; no template is involved.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

use crate::core::config::FileConfig;
use crate::core::security::{PathSecurityError, confine, validate_path};
use crate::domains::drivers::{Driver, DriverError};
use crate::domains::resources::{self, Resource};

/// Driver reading one resource document per identifier from a directory.
#[derive(Debug, Clone)]
pub struct FileDriver {
    directory: PathBuf,
    allow_symlinks: bool,
}

impl FileDriver {
    /// Discriminator selecting this driver.
    pub const NAME: &'static str = "file";

    /// Create a file driver for the configured directory.
    pub fn new(config: &FileConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            allow_symlinks: config.allow_symlinks,
        }
    }

    /// Map an identifier to the document path, confined to the base directory.
    fn locate(&self, identifier: &str) -> Result<PathBuf, DriverError> {
        let path = confine(&self.directory, identifier);
        if path == self.directory {
            return Err(DriverError::not_found(identifier));
        }

        if self.allow_symlinks {
            return Ok(path);
        }

        validate_path(&path, &self.directory).map_err(|e| match e {
            PathSecurityError::PathNotFound { .. } => DriverError::not_found(identifier),
            PathSecurityError::OutsideRootDirectory { .. }
            | PathSecurityError::SymlinkOutsideRoot { .. } => {
                warn!("Refusing to follow {} outside the base directory: {}", identifier, e);
                DriverError::not_found(identifier)
            }
            other => DriverError::resolution(identifier, other),
        })
    }
}

#[async_trait]
impl Driver for FileDriver {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[instrument(skip(self))]
    async fn resolve(&self, identifier: &str) -> Result<Resource, DriverError> {
        let path = self.locate(identifier)?;

        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) => {
                debug!("Unable to read resource file {}: {}", path.display(), e);
                let is_dir = tokio::fs::metadata(&path)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false);

                return if e.kind() == io::ErrorKind::NotFound || is_dir {
                    Err(DriverError::not_found(identifier))
                } else {
                    Err(DriverError::resolution(identifier, e))
                };
            }
        };

        let mut resource = resources::decode(&contents).map_err(|e| {
            warn!("Unable to decode resource file {}: {}", path.display(), e);
            DriverError::resolution(identifier, e)
        })?;
        resource.subject = identifier.to_string();

        Ok(resource)
    }
}
