use std::io;
use std::path::{Component, Path, PathBuf};

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Symlink '{path}' points outside allowed root directory")]
    SymlinkOutsideRoot { path: PathBuf },

    #[error("Cannot canonicalize path '{path}': {error}")]
    CannotCanonicalize { path: PathBuf, error: io::Error },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: PathBuf },

    #[error("IO error for path '{path}': {error}")]
    IoError { path: PathBuf, error: io::Error },
}

/// Joins an untrusted name onto a root directory without letting it escape.
///
/// The name is cleaned lexically as if it were an absolute path under its own
/// virtual root: `.` segments are dropped and `..` never climbs above the
/// start. Both `/` and `\` separate segments. The filesystem is not touched.
///
/// ```rust,ignore
/// let path = confine(Path::new("/srv/webfinger"), "../../etc/passwd");
/// assert_eq!(path, Path::new("/srv/webfinger/etc/passwd"));
/// ```
pub fn confine(root: &Path, name: &str) -> PathBuf {
    let mut segments: Vec<&str> = Vec::new();

    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let mut path = root.to_path_buf();
    for segment in segments {
        // A segment like `C:` would otherwise replace the whole path on Windows.
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) => path.push(part),
            _ => path.push(segment.replace(':', "_")),
        }
    }

    path
}

/// Validates that an existing path resolves inside the root directory.
///
/// This function performs the following checks:
/// 1. Canonicalizes the root and the input path to resolve symlinks
/// 2. Ensures the canonical path is within the canonical root
///
/// # Returns
///
/// * `Ok(PathBuf)` - The canonicalized, validated path
/// * `Err(PathSecurityError)` - If validation fails
pub fn validate_path(path: &Path, root: &Path) -> Result<PathBuf, PathSecurityError> {
    // Canonicalize the root path first
    let canonical_root = root.canonicalize().map_err(|e| PathSecurityError::IoError {
        path: root.to_path_buf(),
        error: e,
    })?;

    // Check if path exists before canonicalization
    if !path.exists() {
        return Err(PathSecurityError::PathNotFound {
            path: path.to_path_buf(),
        });
    }

    let canonical_path = canonicalize_path(path)?;

    if !is_within_root(&canonical_path, &canonical_root) {
        if path.is_symlink() {
            return Err(PathSecurityError::SymlinkOutsideRoot {
                path: path.to_path_buf(),
            });
        }
        return Err(PathSecurityError::OutsideRootDirectory {
            path: canonical_path,
            root: canonical_root,
        });
    }

    Ok(canonical_path)
}

/// Checks if a path is within (or equal to) a root directory
fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Canonicalizes a path, reporting a missing target as `PathNotFound`
fn canonicalize_path(path: &Path) -> Result<PathBuf, PathSecurityError> {
    path.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PathSecurityError::PathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PathSecurityError::CannotCanonicalize {
                path: path.to_path_buf(),
                error: e,
            }
        }
    })
}
