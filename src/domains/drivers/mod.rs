//! Drivers domain module.
//!
//! A driver resolves a requested identifier to a [`Resource`] using one
//! backend. Exactly one driver is built at startup from the driver settings
//! and shared by every request.
//!
//! ## Architecture
//!
//! - `definitions/` - One file per backend (`file`, `ldap`, `sql`)
//! - `registry.rs` - Builds the configured driver from its discriminator
//! - `identifier.rs` - Extracts lookup keys from requested identifiers
//! - `template.rs` - Renders backend attributes into resource documents
//! - `error.rs` - The `NotFound` / `Resolution` error taxonomy
//!
//! ## Adding a New Driver
//!
//! 1. Create a new file in `definitions/` implementing [`Driver`]
//! 2. Export it in `definitions/mod.rs`
//! 3. Add its discriminator to `build_driver()` in `registry.rs`

use async_trait::async_trait;

use crate::domains::resources::Resource;

pub mod definitions;
mod error;
pub mod identifier;
mod registry;
pub mod template;

pub use error::{BackendError, BoxError, DriverError, ErrorKind};
pub use identifier::IdentifierPolicy;
pub use registry::{build_driver, driver_names};
pub use template::{AttributeMap, Render, TemplateError, TemplateRenderer};

/// A backend able to resolve identifiers.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait Driver: Send + Sync {
    /// The discriminator this driver is selected by.
    fn name(&self) -> &'static str;

    /// Resolve an identifier.
    ///
    /// On success the returned resource's subject is `identifier`, verbatim.
    async fn resolve(&self, identifier: &str) -> Result<Resource, DriverError>;
}
