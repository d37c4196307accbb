//! Resource codec.
//!
//! Decodes the YAML documents produced by files and templates, and encodes
//! resources as compact JRD JSON for the wire.

use super::error::ResourceError;
use super::model::Resource;

/// Media type of an encoded resource.
pub const JRD_CONTENT_TYPE: &str = "application/jrd+json";

/// Decode a YAML document into a resource.
///
/// Unknown fields are ignored. Missing or null collections decode as empty.
/// An empty document decodes as an empty resource.
pub fn decode(bytes: &[u8]) -> Result<Resource, ResourceError> {
    let resource: Option<Resource> = serde_yaml::from_slice(bytes)?;
    Ok(resource.unwrap_or_default())
}

/// Encode a resource as compact JRD JSON.
///
/// Empty optional fields are omitted from the output.
pub fn encode(resource: &Resource) -> Result<Vec<u8>, ResourceError> {
    Ok(serde_json::to_vec(resource)?)
}
