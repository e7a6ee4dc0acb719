//! Terminal feedback with CI fallback
//!
//! First-run extraction and runtime installation can take a while; in an
//! interactive terminal they get a spinner on stderr. Non-interactive runs
//! stay silent and rely on tracing output instead.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

/// UI context that determines output behavior
#[derive(Debug, Clone)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        Self {
            interactive: Self::detect_interactive(),
        }
    }

    /// Create a non-interactive context (for testing or explicit CI mode)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Check if we should use fancy output (spinners, colors)
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn detect_interactive() -> bool {
        // Spinners go to stderr; stdout belongs to the replaced process
        if !std::io::stderr().is_terminal() {
            return false;
        }

        let ci_vars = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "JENKINS_URL"];
        for var in ci_vars {
            if std::env::var_os(var).is_some() {
                return false;
            }
        }

        true
    }
}

/// A bootstrap stage spinner with CI fallback
pub struct StageSpinner {
    spinner: Option<ProgressBar>,
}

impl StageSpinner {
    /// Start a spinner for a named stage
    pub fn start(ctx: &UiContext, message: &str) -> Self {
        let spinner = if ctx.use_fancy_output() {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap()
                    .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
            );
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(120));
            Some(bar)
        } else {
            info!("{message}");
            None
        };
        Self { spinner }
    }

    /// Finish and clear the spinner
    pub fn finish(self) {
        if let Some(bar) = self.spinner {
            bar.finish_and_clear();
        }
    }
}
