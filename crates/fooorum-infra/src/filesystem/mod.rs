//! Filesystem adapters for the Fooorum client.
//!
//! Resolves the data directory and provides the file-backed token store.

pub mod token_store;

pub use token_store::FileTokenStore;

use std::path::{Path, PathBuf};

/// File holding the persisted bearer token, relative to the data directory.
pub const TOKEN_FILE: &str = "access_token";

/// `{data_dir}/access_token`.
pub fn token_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TOKEN_FILE)
}

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `FOOORUM_DATA_DIR` environment variable
/// 2. `~/.fooorum`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FOOORUM_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".fooorum");
    }

    // Last resort: current directory
    PathBuf::from(".fooorum")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_path_is_inside_data_dir() {
        let path = token_path(Path::new("/tmp/fooorum"));
        assert_eq!(path, PathBuf::from("/tmp/fooorum/access_token"));
    }

    #[test]
    fn resolve_data_dir_is_never_empty() {
        assert!(!resolve_data_dir().as_os_str().is_empty());
    }
}
