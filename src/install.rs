//! Managed runtime installation
//!
//! Downloads an official Bun release asset for the current platform,
//! verifies it against the published checksum manifest, and places the
//! binary into the shared bin directory. Implements the [`Installer`]
//! contract used by runtime provisioning; tests substitute a fake.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{FacetError, FacetResult};
use crate::runtime::Installer;

const RELEASE_BASE: &str = "https://github.com/oven-sh/bun/releases";
const CHECKSUM_MANIFEST: &str = "SHASUMS256.txt";

/// Installs runtime binaries from the official release channel
pub struct ReleaseInstaller;

impl Installer for ReleaseInstaller {
    fn install(&self, name: &str, version: &str, bin_dir: &Path) -> FacetResult<()> {
        let asset = release_asset(name, std::env::consts::OS, std::env::consts::ARCH)?;
        let base = release_url(name, version);
        debug!(%asset, %base, "installing runtime release");

        let manifest = fetch_text(&format!("{base}/{CHECKSUM_MANIFEST}"))?;
        let expected = checksum_for(&manifest, &asset).ok_or_else(|| {
            FacetError::install(name, format!("no published checksum for {asset}"))
        })?;

        let scratch =
            tempfile::tempdir().map_err(|e| FacetError::io("creating scratch directory", e))?;
        let archive = scratch.path().join(&asset);
        download_verified(&format!("{base}/{asset}"), &archive, &expected, &asset)?;

        let unpacked = scratch.path().join("unpacked");
        extract_zip(&archive, &unpacked).map_err(|reason| FacetError::install(name, reason))?;

        let binary = find_binary(&unpacked, name).ok_or_else(|| {
            FacetError::install(name, format!("{asset} did not contain a {name} binary"))
        })?;
        place_binary(&binary, &bin_dir.join(name))
    }
}

/// Map OS/arch onto a release asset name. Only platforms with published
/// assets are supported; everything else is a hard error with a hint.
fn release_asset(name: &str, os: &str, arch: &str) -> FacetResult<String> {
    let unsupported = || FacetError::UnsupportedPlatform {
        name: name.to_string(),
        target: format!("{os}/{arch}"),
    };
    let os = match os {
        "macos" => "darwin",
        "linux" => "linux",
        _ => return Err(unsupported()),
    };
    let arch = match arch {
        "x86_64" => "x64",
        "aarch64" => "aarch64",
        _ => return Err(unsupported()),
    };
    Ok(format!("{name}-{os}-{arch}.zip"))
}

fn release_url(name: &str, version: &str) -> String {
    match version {
        "latest" => format!("{RELEASE_BASE}/latest/download"),
        pinned => format!("{RELEASE_BASE}/download/{name}-v{pinned}"),
    }
}

fn fetch_text(url: &str) -> FacetResult<String> {
    let resp = ureq::get(url).call().map_err(|e| FacetError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut body = String::new();
    resp.into_body()
        .into_reader()
        .read_to_string(&mut body)
        .map_err(|e| FacetError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
    Ok(body)
}

/// Find the checksum for `asset` in a `sha256sum`-format manifest.
fn checksum_for(manifest: &str, asset: &str) -> Option<String> {
    for line in manifest.lines() {
        let mut fields = line.split_whitespace();
        let (Some(hash), Some(file)) = (fields.next(), fields.next()) else {
            continue;
        };
        if file.trim_start_matches('*') == asset {
            return Some(hash.to_ascii_lowercase());
        }
    }
    None
}

/// Stream the asset to `dest`, hashing while writing, and fail on mismatch.
fn download_verified(url: &str, dest: &Path, expected: &str, asset: &str) -> FacetResult<()> {
    let resp = ureq::get(url).call().map_err(|e| FacetError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let mut reader = resp.into_body().into_reader();

    let mut file = File::create(dest).map_err(|e| FacetError::io("creating download file", e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|e| FacetError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])
            .map_err(|e| FacetError::io("writing download file", e))?;
    }
    file.flush()
        .map_err(|e| FacetError::io("flushing download file", e))?;

    let actual = hex::encode(hasher.finalize());
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(FacetError::ChecksumMismatch {
            asset: asset.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

fn extract_zip(path: &Path, out_dir: &Path) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("open {}: {e}", path.display()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| format!("open zip: {e}"))?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| format!("zip entry: {e}"))?;
        let name = entry.name().to_string();
        let rel = sanitize_zip_path(Path::new(&name)).ok_or_else(|| format!("unsafe zip path {name}"))?;
        let out_path = out_dir.join(rel);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| format!("mkdir {}: {e}", out_path.display()))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("mkdir {}: {e}", parent.display()))?;
        }
        let mut out =
            File::create(&out_path).map_err(|e| format!("create {}: {e}", out_path.display()))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| format!("write {}: {e}", out_path.display()))?;
    }
    Ok(())
}

fn sanitize_zip_path(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::ParentDir => return None,
            Component::CurDir => {}
            Component::Normal(part) => out.push(part),
        }
    }
    Some(out)
}

/// Release zips nest the binary under a per-target directory; search for it.
fn find_binary(dir: &Path, name: &str) -> Option<PathBuf> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).ok()?.flatten() {
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if entry.file_name() == name {
            return Some(path);
        }
    }
    for subdir in subdirs {
        if let Some(found) = find_binary(&subdir, name) {
            return Some(found);
        }
    }
    None
}

/// Move the extracted binary into place with the executable bit set,
/// going through a sibling temp name so a concurrent run never observes
/// a partially written binary.
fn place_binary(src: &Path, dest: &Path) -> FacetResult<()> {
    let tmp = dest.with_extension("tmp");
    fs::copy(src, &tmp).map_err(|e| FacetError::io("copying runtime binary", e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o755);
        fs::set_permissions(&tmp, perms)
            .map_err(|e| FacetError::io("setting runtime binary permissions", e))?;
    }
    fs::rename(&tmp, dest).map_err(|e| FacetError::io("moving runtime binary into place", e))?;
    Ok(())
}
