//! Resources domain module.
//!
//! This module holds the resource descriptor model and the codec that moves
//! it between the YAML produced by backends and the JRD JSON served to
//! clients.
//!
//! ## Architecture
//!
//! - `model.rs` - `Resource` and `Link` types
//! - `codec.rs` - YAML decoding and JSON encoding
//! - `error.rs` - codec errors

pub mod codec;
mod error;
mod model;

pub use codec::{JRD_CONTENT_TYPE, decode, encode};
pub use error::ResourceError;
pub use model::{Link, Properties, Resource};
