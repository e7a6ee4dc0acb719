//! Error types for the Facet launcher
//!
//! All modules use `FacetResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for launcher operations
pub type FacetResult<T> = Result<T, FacetError>;

/// All errors that can abort a launch
#[derive(Error, Debug)]
pub enum FacetError {
    // Cache errors
    #[error("Failed to extract embedded payload into {path}: {reason}")]
    CacheExtract { path: PathBuf, reason: String },

    // Runtime provisioning errors
    #[error("Failed to install {name}: {reason}")]
    InstallFailed { name: String, reason: String },

    #[error("{name} binary not found after install at {path}")]
    InstallVerify { name: String, path: PathBuf },

    #[error("Download failed: {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Checksum mismatch for {asset}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        asset: String,
        expected: String,
        actual: String,
    },

    #[error("No {name} release available for this platform: {target}")]
    UnsupportedPlatform { name: String, target: String },

    // Process errors
    #[error("Failed to launch {command}")]
    Exec {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl FacetError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an extraction error
    pub fn extract(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::CacheExtract {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an install error
    pub fn install(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstallFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } | Self::DownloadFailed { .. } => {
                Some("Check your network connection and re-run")
            }
            Self::ChecksumMismatch { .. } => Some("Re-run to retry the download"),
            Self::UnsupportedPlatform { .. } => {
                Some("Install Bun manually from https://bun.sh and make sure it is on PATH")
            }
            _ => None,
        }
    }
}
