//! Driver definitions module.
//!
//! Each backend lives in its own file. The directory and SQL drivers are
//! compiled only with their cargo features.

mod file;
#[cfg(feature = "ldap")]
mod ldap;
#[cfg(feature = "sql")]
mod sql;

pub use file::FileDriver;
#[cfg(feature = "ldap")]
pub use ldap::{
    DirectoryClient, DirectoryConnector, DirectoryEntry, LdapConnector, LdapDriver,
};
#[cfg(feature = "sql")]
pub use sql::{PoolRowSource, Row, RowSource, SqlDialect, SqlDriver};

#[cfg(any(feature = "ldap", feature = "sql"))]
use super::{AttributeMap, DriverError, Render};
#[cfg(any(feature = "ldap", feature = "sql"))]
use crate::domains::resources::{self, Resource};

/// Render backend attributes into a resource for `identifier`.
#[cfg(any(feature = "ldap", feature = "sql"))]
fn render_resource(
    renderer: &dyn Render,
    identifier: &str,
    attributes: &AttributeMap,
) -> Result<Resource, DriverError> {
    let document = renderer
        .render(attributes)
        .map_err(|e| DriverError::resolution(identifier, e))?;

    let mut resource =
        resources::decode(&document).map_err(|e| DriverError::resolution(identifier, e))?;
    resource.subject = identifier.to_string();

    Ok(resource)
}
