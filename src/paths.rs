//! Cache and binary location resolution
//!
//! All environment reads for path resolution happen in [`Paths::from_env`];
//! everything downstream works from the resolved struct.

use std::path::{Path, PathBuf};

/// Environment variable overriding the cache/bin root directory
pub const CACHE_DIR_ENV: &str = "FACET_CACHE_DIR";

/// Resolved filesystem locations for a launcher run
#[derive(Debug, Clone)]
pub struct Paths {
    root: Option<PathBuf>,
    home: PathBuf,
}

impl Paths {
    /// Resolve locations from the process environment.
    ///
    /// A missing home directory is not fatal here: paths degrade to
    /// relative ones and any real problem surfaces at the first
    /// filesystem operation that needs them.
    pub fn from_env() -> Self {
        let root = std::env::var_os(CACHE_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let home = dirs::home_dir().unwrap_or_default();
        Self::resolve(root, home)
    }

    /// Build from explicit values (tests and callers that already read the
    /// environment).
    pub fn resolve(root: Option<PathBuf>, home: PathBuf) -> Self {
        Self { root, home }
    }

    /// Versioned cache directory for the extracted payload
    pub fn cache_dir(&self, version: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(version),
            None => self.home.join(".facet").join("cache").join(version),
        }
    }

    /// Shared directory for launcher-provisioned binaries
    pub fn bin_dir(&self) -> PathBuf {
        match &self.root {
            Some(root) => root.join("bin"),
            None => self.home.join(".facet").join("bin"),
        }
    }

    /// The user's home directory, for scanning third-party tool caches
    pub fn home(&self) -> &Path {
        &self.home
    }
}
