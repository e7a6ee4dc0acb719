//! Chrome/Chromium discovery for the PDF pipeline
//!
//! PDF rendering needs a browser, but shipping one is not this launcher's
//! job. Discovery is best-effort: explicit overrides first, then the
//! Playwright cache, then system installs, then the Puppeteer cache.
//! Nothing found is a valid outcome; PDF output simply becomes
//! unavailable downstream.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Primary override, also the variable the downstream tooling reads
pub const PRIMARY_ENV: &str = "PUPPETEER_EXECUTABLE_PATH";
/// Alternate override convention
pub const FALLBACK_ENV: &str = "CHROME_PATH";

/// Explicit browser-path overrides, read once from the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub primary: Option<PathBuf>,
    pub fallback: Option<PathBuf>,
}

impl Overrides {
    pub fn from_env() -> Self {
        Self {
            primary: env_path(PRIMARY_ENV),
            fallback: env_path(FALLBACK_ENV),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Locate a usable browser binary, or `None` if every strategy misses.
pub fn detect(home: &Path) -> Option<PathBuf> {
    let found = detect_with(&Overrides::from_env(), home);
    match &found {
        Some(path) => debug!(path = %path.display(), "browser detected"),
        None => debug!("no browser found; PDF rendering will be unavailable"),
    }
    found
}

/// Strategy list in priority order, stopping at the first hit.
pub fn detect_with(overrides: &Overrides, home: &Path) -> Option<PathBuf> {
    overrides
        .primary
        .clone()
        .or_else(|| overrides.fallback.clone())
        .or_else(|| playwright_chromium(home))
        .or_else(system_chrome)
        .or_else(|| puppeteer_chrome(home))
}

fn playwright_chromium(home: &Path) -> Option<PathBuf> {
    let cache = home.join(".cache").join("ms-playwright");
    first_versioned_match(&cache, "chromium-", playwright_suffix()?)
}

fn playwright_suffix() -> Option<&'static [&'static str]> {
    if cfg!(target_os = "macos") {
        Some(&["chrome-mac", "Chromium.app", "Contents", "MacOS", "Chromium"])
    } else if cfg!(target_os = "linux") {
        Some(&["chrome-linux", "chrome"])
    } else {
        None
    }
}

fn system_chrome() -> Option<PathBuf> {
    system_chrome_paths()
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

fn system_chrome_paths() -> &'static [&'static str] {
    if cfg!(target_os = "macos") {
        &["/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"]
    } else if cfg!(target_os = "linux") {
        &[
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium-browser",
            "/usr/bin/chromium",
        ]
    } else {
        &[]
    }
}

fn puppeteer_chrome(home: &Path) -> Option<PathBuf> {
    let cache = home.join(".cache").join("puppeteer").join("chrome");
    first_versioned_match(&cache, "", puppeteer_suffix()?)
}

fn puppeteer_suffix() -> Option<&'static [&'static str]> {
    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            Some(&[
                "chrome-mac-arm64",
                "Google Chrome for Testing.app",
                "Contents",
                "MacOS",
                "Google Chrome for Testing",
            ])
        } else {
            Some(&[
                "chrome-mac-x64",
                "Google Chrome for Testing.app",
                "Contents",
                "MacOS",
                "Google Chrome for Testing",
            ])
        }
    } else if cfg!(target_os = "linux") {
        Some(&["chrome-linux64", "chrome"])
    } else {
        None
    }
}

/// Scan `dir` for entries named with `prefix`, in lexical order, and return
/// the first one under which the fixed `suffix` path exists. Mirrors a
/// single-wildcard glob over versioned tool caches.
fn first_versioned_match(dir: &Path, prefix: &str, suffix: &[&str]) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| n.starts_with(prefix))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| {
            let mut candidate = dir.join(name);
            for part in suffix {
                candidate.push(part);
            }
            candidate
        })
        .find(|candidate| candidate.exists())
}
