//! Resource codec error types.

use thiserror::Error;

/// Errors that can occur while decoding or encoding a resource.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The YAML document could not be decoded into a resource.
    #[error("could not decode resource document: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// The resource could not be encoded as JSON.
    #[error("could not encode resource as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}
