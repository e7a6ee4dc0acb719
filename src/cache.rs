//! Versioned payload cache
//!
//! The embedded CLI tarball is extracted once per version into the cache
//! root. A sentinel file marks a completed extraction; its existence is the
//! only thing consulted on the fast path, so every run after the first costs
//! a single stat. There is no cross-process lock: two cold-start processes
//! may both extract, and last-writer-wins with identical content.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{FacetError, FacetResult};
use crate::paths::Paths;
use crate::ui::{StageSpinner, UiContext};

/// Marker file written after a successful extraction
pub const SENTINEL: &str = ".extracted";

/// Ensure the payload for `version` is extracted, returning the cache
/// directory. Idempotent; a failed extraction leaves no sentinel and is
/// retried on the next run.
pub fn ensure_cache(
    paths: &Paths,
    version: &str,
    payload: &[u8],
    ui: &UiContext,
) -> FacetResult<PathBuf> {
    let cache_dir = paths.cache_dir(version);
    let sentinel = cache_dir.join(SENTINEL);

    if sentinel.exists() {
        debug!(dir = %cache_dir.display(), "cache already extracted");
        return Ok(cache_dir);
    }

    debug!(dir = %cache_dir.display(), "extracting payload");
    let spinner = StageSpinner::start(ui, &format!("Preparing facet {version}"));
    let result = extract_payload(&cache_dir, payload);
    spinner.finish();
    result?;

    fs::write(&sentinel, version).map_err(|e| FacetError::io("writing cache sentinel", e))?;

    Ok(cache_dir)
}

fn extract_payload(cache_dir: &Path, payload: &[u8]) -> FacetResult<()> {
    fs::create_dir_all(cache_dir).map_err(|e| FacetError::io("creating cache directory", e))?;

    // The temp file is removed when `tmp` drops, including on unpack failure.
    let mut tmp = tempfile::Builder::new()
        .prefix("facet-cli-")
        .suffix(".tar.gz")
        .tempfile()
        .map_err(|e| FacetError::io("creating temp file", e))?;
    tmp.write_all(payload)
        .map_err(|e| FacetError::io("writing payload to temp file", e))?;
    tmp.flush()
        .map_err(|e| FacetError::io("flushing temp file", e))?;

    let file = tmp
        .reopen()
        .map_err(|e| FacetError::io("reopening temp file", e))?;
    unpack_tar_gz(file, cache_dir)
}

fn unpack_tar_gz(file: File, out_dir: &Path) -> FacetResult<()> {
    let gz = GzDecoder::new(file);
    let mut archive = tar::Archive::new(gz);

    let entries = archive
        .entries()
        .map_err(|e| FacetError::extract(out_dir, e.to_string()))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| FacetError::extract(out_dir, e.to_string()))?;
        let entry_path = entry
            .path()
            .map_err(|e| FacetError::extract(out_dir, e.to_string()))?
            .into_owned();
        let rel = sanitize_entry_path(&entry_path)
            .ok_or_else(|| FacetError::extract(out_dir, format!("unsafe entry path {}", entry_path.display())))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let out_path = out_dir.join(rel);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| FacetError::io("creating cache subdirectory", e))?;
        }
        entry
            .unpack(&out_path)
            .map_err(|e| FacetError::extract(&out_path, e.to_string()))?;
    }
    Ok(())
}

/// Reject absolute paths and parent-directory traversal in archive entries.
fn sanitize_entry_path(path: &Path) -> Option<PathBuf> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    fn payload_with_entry(path: &str, data: &[u8]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn test_paths(root: &Path) -> Paths {
        Paths::resolve(Some(root.to_path_buf()), PathBuf::new())
    }

    #[test]
    fn extracts_payload_and_writes_sentinel() {
        let root = tempfile::tempdir().unwrap();
        let payload = payload_with_entry("cli/src/cli.ts", b"console.log(1);\n");
        let ui = UiContext::non_interactive();

        let dir = ensure_cache(&test_paths(root.path()), "1.0.0", &payload, &ui).unwrap();

        assert_eq!(dir, root.path().join("1.0.0"));
        assert_eq!(
            fs::read(dir.join("cli/src/cli.ts")).unwrap(),
            b"console.log(1);\n"
        );
        assert_eq!(fs::read_to_string(dir.join(SENTINEL)).unwrap(), "1.0.0");
    }

    #[test]
    fn second_call_skips_extraction() {
        let root = tempfile::tempdir().unwrap();
        let payload = payload_with_entry("cli/src/cli.ts", b"x");
        let ui = UiContext::non_interactive();
        let paths = test_paths(root.path());

        let first = ensure_cache(&paths, "1.0.0", &payload, &ui).unwrap();
        // If the second call re-extracted, this file would come back.
        fs::remove_file(first.join("cli/src/cli.ts")).unwrap();

        let second = ensure_cache(&paths, "1.0.0", &payload, &ui).unwrap();
        assert_eq!(first, second);
        assert!(!second.join("cli/src/cli.ts").exists());
    }

    #[test]
    fn corrupt_payload_fails_without_sentinel() {
        let root = tempfile::tempdir().unwrap();
        let ui = UiContext::non_interactive();
        let paths = test_paths(root.path());

        let err = ensure_cache(&paths, "1.0.0", b"not a tarball", &ui).unwrap_err();
        assert!(matches!(err, FacetError::CacheExtract { .. }));
        assert!(!root.path().join("1.0.0").join(SENTINEL).exists());
    }

    #[test]
    fn failed_extraction_is_retried() {
        let root = tempfile::tempdir().unwrap();
        let ui = UiContext::non_interactive();
        let paths = test_paths(root.path());

        ensure_cache(&paths, "1.0.0", b"garbage", &ui).unwrap_err();

        let payload = payload_with_entry("cli/src/cli.ts", b"ok");
        let dir = ensure_cache(&paths, "1.0.0", &payload, &ui).unwrap();
        assert!(dir.join(SENTINEL).exists());
    }

    #[test]
    fn rejects_traversal_entries() {
        let root = tempfile::tempdir().unwrap();
        let ui = UiContext::non_interactive();
        let payload = payload_with_entry("../escape.txt", b"nope");

        let err = ensure_cache(&test_paths(root.path()), "1.0.0", &payload, &ui).unwrap_err();
        assert!(err.to_string().contains("unsafe entry path"));
    }

    #[test]
    fn sanitize_strips_current_dir() {
        assert_eq!(
            sanitize_entry_path(Path::new("./cli/src/cli.ts")).unwrap(),
            PathBuf::from("cli/src/cli.ts")
        );
        assert!(sanitize_entry_path(Path::new("/etc/passwd")).is_none());
        assert!(sanitize_entry_path(Path::new("a/../../b")).is_none());
    }
}
