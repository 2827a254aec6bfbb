//! Executable lookup collaborator
//!
//! Thin wrapper over a PATH search: all candidates in order, filtered to
//! the ones actually executable by the current user.

use std::path::{Path, PathBuf};

/// Candidate paths for `name`, in PATH order. Missing commands yield an
/// empty list, not an error.
pub fn locate(name: &str) -> Vec<PathBuf> {
    match which::which_all(name) {
        Ok(found) => found.collect(),
        Err(_) => Vec::new(),
    }
}

/// First executable candidate for `name`.
pub fn first_executable(name: &str) -> Option<PathBuf> {
    locate(name).into_iter().find(|p| is_executable(p))
}

/// Check if a path is an executable regular file.
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            metadata.is_file() && (metadata.permissions().mode() & 0o111 != 0)
        } else {
            false
        }
    }

    #[cfg(windows)]
    {
        std::fs::metadata(path)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}
