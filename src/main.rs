//! Facet launcher entry point
//!
//! Everything except the version query ends in process replacement, so
//! this binary's own output is limited to bootstrap diagnostics on stderr.

use std::process::ExitCode;

use console::style;
use facet::launcher::{self, Options};
use tracing_subscriber::EnvFilter;

static PAYLOAD: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/facet-cli.tar.gz"));

const VERSION: &str = env!("CARGO_PKG_VERSION");
const COMMIT: &str = env!("FACET_COMMIT");

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_env("FACET_LOG").unwrap_or_else(|_| EnvFilter::new("facet=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let opts = Options {
        version: VERSION,
        commit: COMMIT,
        payload: PAYLOAD,
        args: std::env::args_os().skip(1).collect(),
    };

    match launcher::run(opts) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}
