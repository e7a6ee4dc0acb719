//! Bun runtime provisioning
//!
//! Resolution order: the user's own installation on PATH, then a copy this
//! launcher installed previously, then a fresh managed install. The managed
//! copy lives in the shared bin directory and is reused by every later run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{FacetError, FacetResult};
use crate::paths::Paths;
use crate::ui::{StageSpinner, UiContext};

/// Name of the managed runtime binary
pub const RUNTIME_NAME: &str = "bun";

/// Where a resolved runtime came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeSource {
    /// Found on the process search path
    SearchPath,
    /// Previously provisioned into the shared bin directory
    Managed,
    /// Installed by this run
    Installed,
}

/// A resolved runtime binary
#[derive(Debug, Clone)]
pub struct Runtime {
    pub path: PathBuf,
    pub source: RuntimeSource,
}

/// Install mechanism contract: `name` at `version` ends up as an executable
/// at `<bin_dir>/<name>`.
pub trait Installer {
    fn install(&self, name: &str, version: &str, bin_dir: &Path) -> FacetResult<()>;
}

/// Ensure Bun is available, installing it into the shared bin directory if
/// neither the search path nor a previous run provides it.
pub fn ensure_runtime(
    paths: &Paths,
    installer: &dyn Installer,
    ui: &UiContext,
) -> FacetResult<Runtime> {
    ensure_named(RUNTIME_NAME, paths, installer, ui)
}

fn ensure_named(
    name: &str,
    paths: &Paths,
    installer: &dyn Installer,
    ui: &UiContext,
) -> FacetResult<Runtime> {
    if let Ok(path) = which::which(name) {
        debug!(path = %path.display(), "runtime found on search path");
        return Ok(Runtime {
            path,
            source: RuntimeSource::SearchPath,
        });
    }

    let bin_dir = paths.bin_dir();
    let managed = bin_dir.join(name);
    if managed.exists() {
        debug!(path = %managed.display(), "reusing managed runtime");
        return Ok(Runtime {
            path: managed,
            source: RuntimeSource::Managed,
        });
    }

    fs::create_dir_all(&bin_dir).map_err(|e| FacetError::io("creating bin directory", e))?;

    let spinner = StageSpinner::start(ui, &format!("Installing {name} (first run)"));
    let result = installer.install(name, "latest", &bin_dir);
    spinner.finish();
    result?;

    if !managed.exists() {
        return Err(FacetError::InstallVerify {
            name: name.to_string(),
            path: managed,
        });
    }

    debug!(path = %managed.display(), "runtime installed");
    Ok(Runtime {
        path: managed,
        source: RuntimeSource::Installed,
    })
}
