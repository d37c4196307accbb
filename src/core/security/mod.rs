// Security module for path confinement
//
// This module keeps file lookups inside the configured base directory,
// preventing path traversal through crafted identifiers or symlinks.

pub mod path_validator;

pub use path_validator::{PathSecurityError, confine, validate_path};
