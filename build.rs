//! Embeds the CLI payload and stamps the commit hash.
//!
//! Release builds point `FACET_PAYLOAD` at the real CLI tarball produced by
//! the packaging pipeline. Without it, the committed `payload/` stub tree is
//! packed so that development builds always compile and run.

use std::env;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use flate2::write::GzEncoder;
use flate2::Compression;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-env-changed=FACET_PAYLOAD");
    println!("cargo:rerun-if-env-changed=FACET_COMMIT");
    println!("cargo:rerun-if-changed=payload");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let dest = out_dir.join("facet-cli.tar.gz");

    match env::var_os("FACET_PAYLOAD") {
        Some(tarball) => {
            std::fs::copy(&tarball, &dest)?;
        }
        None => pack_stub_payload(Path::new("payload"), &dest)?,
    }

    println!("cargo:rustc-env=FACET_COMMIT={}", commit_hash());

    Ok(())
}

/// Pack the stub payload tree into a gzip tarball with paths relative to the
/// archive root, matching the layout of the release tarball.
fn pack_stub_payload(src: &Path, dest: &Path) -> Result<(), Box<dyn Error>> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.append_dir_all(".", src)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

fn commit_hash() -> String {
    if let Ok(commit) = env::var("FACET_COMMIT") {
        if !commit.is_empty() {
            return commit;
        }
    }

    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
