//! Launch orchestration
//!
//! Drives the bootstrap pipeline: version short-circuit, cache extraction,
//! runtime provisioning, browser discovery, then process replacement into
//! `bun run <entry>` with the original arguments appended. On unix the
//! launcher process image is replaced outright; elsewhere the runtime runs
//! as a child and its exit code is forwarded.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, ExitCode};

use tracing::debug;

use crate::browser;
use crate::cache;
use crate::error::{FacetError, FacetResult};
use crate::install::ReleaseInstaller;
use crate::paths::Paths;
use crate::runtime;
use crate::ui::UiContext;

/// Inputs threaded from the binary entry point
#[derive(Debug)]
pub struct Options {
    pub version: &'static str,
    pub commit: &'static str,
    pub payload: &'static [u8],
    pub args: Vec<OsString>,
}

/// Environment variable handed to the embedded CLI with its package root
pub const PACKAGE_ROOT_ENV: &str = "FACET_PACKAGE_ROOT";

/// Run the launcher to completion. On unix a successful launch never
/// returns; the `ExitCode` covers the version query and the non-unix
/// child-process fallback.
pub fn run(opts: Options) -> FacetResult<ExitCode> {
    if wants_version(&opts.args) {
        println!("facet {} ({})", opts.version, opts.commit);
        return Ok(ExitCode::SUCCESS);
    }

    let paths = Paths::from_env();
    let ui = UiContext::detect();

    let cache_dir = cache::ensure_cache(&paths, opts.version, opts.payload, &ui)?;
    let runtime = runtime::ensure_runtime(&paths, &ReleaseInstaller, &ui)?;
    debug!(path = %runtime.path.display(), source = ?runtime.source, "runtime resolved");

    // The launch environment is assembled here and applied exactly once,
    // at hand-off; no component mutates the process environment.
    let mut env = LaunchEnv::default();
    env.set(PACKAGE_ROOT_ENV, cache_dir.as_os_str());
    if let Some(browser) = browser::detect(paths.home()) {
        env.set(browser::PRIMARY_ENV, browser.as_os_str());
    }

    let entry = cache_dir.join("cli").join("src").join("cli.ts");
    hand_off(&runtime.path, &entry, &opts.args, &env)
}

/// Version flags are recognized anywhere in the argument vector; every
/// other argument belongs to the embedded CLI and is forwarded untouched.
fn wants_version(args: &[OsString]) -> bool {
    args.iter().any(|a| a == "--version" || a == "-V")
}

/// Extra environment for the replaced process
#[derive(Debug, Default)]
pub struct LaunchEnv {
    vars: Vec<(&'static str, OsString)>,
}

impl LaunchEnv {
    pub fn set(&mut self, key: &'static str, value: impl Into<OsString>) {
        self.vars.push((key, value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_os_str())
    }

    fn apply(&self, cmd: &mut Command) {
        for (key, value) in &self.vars {
            cmd.env(key, value);
        }
    }
}

fn hand_off(
    runtime: &Path,
    entry: &Path,
    args: &[OsString],
    env: &LaunchEnv,
) -> FacetResult<ExitCode> {
    let mut cmd = Command::new(runtime);
    cmd.arg("run").arg(entry).args(args);
    env.apply(&mut cmd);
    debug!(runtime = %runtime.display(), entry = %entry.display(), "handing off");

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.arg0(runtime::RUNTIME_NAME);
        // exec only returns on failure
        let err = cmd.exec();
        Err(FacetError::Exec {
            command: runtime.display().to_string(),
            source: err,
        })
    }
    #[cfg(not(unix))]
    {
        let status = cmd.status().map_err(|e| FacetError::Exec {
            command: runtime.display().to_string(),
            source: e,
        })?;
        let code = status.code().unwrap_or(1);
        Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
    }
}
