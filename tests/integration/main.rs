//! Integration tests for the facet launcher

mod version_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;

    fn facet() -> Command {
        cargo_bin_cmd!("facet")
    }

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    #[test]
    fn version_displays() {
        facet()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::starts_with(format!("facet {VERSION} (")));
    }

    #[test]
    fn version_short_flag() {
        facet()
            .arg("-V")
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("facet {VERSION}")));
    }

    #[test]
    fn version_flag_recognized_anywhere() {
        facet()
            .args(["generate", "html", "--version"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("facet "));
    }

    #[test]
    fn version_performs_no_cache_io() {
        let root = tempfile::tempdir().unwrap();

        facet()
            .env("FACET_CACHE_DIR", root.path())
            .arg("--version")
            .assert()
            .success();

        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn version_ignores_unusable_cache_root() {
        facet()
            .env("FACET_CACHE_DIR", "/nonexistent/never/created")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("facet "));
    }
}

#[cfg(unix)]
mod handoff_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    const VERSION: &str = env!("CARGO_PKG_VERSION");

    fn facet() -> Command {
        cargo_bin_cmd!("facet")
    }

    /// A stand-in `bun` that reports what the launcher handed it.
    fn fake_runtime(dir: &Path) -> PathBuf {
        let path = dir.join("bun");
        fs::write(
            &path,
            "#!/bin/sh\necho \"argv:$@\"\necho \"package_root:$FACET_PACKAGE_ROOT\"\necho \"browser:$PUPPETEER_EXECUTABLE_PATH\"\n",
        )
        .unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn first_run_extracts_and_hands_off() {
        let cache = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fake_runtime(bin.path());

        let entry = cache.path().join(VERSION).join("cli/src/cli.ts");
        facet()
            .env("FACET_CACHE_DIR", cache.path())
            .env("PATH", bin.path())
            .args(["generate", "html", "-o", "out.html"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains(format!(
                    "argv:run {} generate html -o out.html",
                    entry.display()
                ))
                .and(predicate::str::contains(format!(
                    "package_root:{}",
                    cache.path().join(VERSION).display()
                ))),
            );

        assert!(entry.exists(), "payload should be extracted");
        let sentinel = cache.path().join(VERSION).join(".extracted");
        assert_eq!(fs::read_to_string(sentinel).unwrap(), VERSION);
    }

    #[test]
    fn second_run_skips_extraction() {
        let cache = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fake_runtime(bin.path());

        let run = || {
            facet()
                .env("FACET_CACHE_DIR", cache.path())
                .env("PATH", bin.path())
                .arg("status")
                .assert()
                .success()
        };

        run();
        // A re-extraction would restore this file.
        let extracted = cache.path().join(VERSION).join("cli/src/cli.ts");
        fs::remove_file(&extracted).unwrap();

        run();
        assert!(!extracted.exists(), "fast path must not re-extract");
    }

    #[test]
    fn browser_override_is_forwarded() {
        let cache = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fake_runtime(bin.path());

        facet()
            .env("FACET_CACHE_DIR", cache.path())
            .env("PATH", bin.path())
            .env("PUPPETEER_EXECUTABLE_PATH", "/custom/chrome")
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("browser:/custom/chrome"));
    }

    #[test]
    fn chrome_path_alias_maps_to_primary_variable() {
        let cache = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        fake_runtime(bin.path());

        facet()
            .env("FACET_CACHE_DIR", cache.path())
            .env("PATH", bin.path())
            .env("CHROME_PATH", "/alias/chrome")
            .env_remove("PUPPETEER_EXECUTABLE_PATH")
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("browser:/alias/chrome"));
    }

    #[test]
    fn missing_runtime_aborts_with_diagnostic() {
        let cache = tempfile::tempdir().unwrap();
        let empty = tempfile::tempdir().unwrap();

        // No bun on PATH and no network route to an install: the launch
        // must fail with a non-zero exit and an error on stderr.
        facet()
            .env("FACET_CACHE_DIR", cache.path())
            .env("PATH", empty.path())
            .env("https_proxy", "http://127.0.0.1:1")
            .env("HTTPS_PROXY", "http://127.0.0.1:1")
            .env("ALL_PROXY", "http://127.0.0.1:1")
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }
}
