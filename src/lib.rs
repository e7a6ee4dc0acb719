//! Facet launcher - self-extracting bootstrap for the Facet CLI
//!
//! Embeds the CLI payload, materializes it into a per-user versioned
//! cache, provisions the Bun runtime, and replaces itself with the CLI.

pub mod browser;
pub mod cache;
pub mod error;
pub mod install;
pub mod launcher;
pub mod paths;
pub mod runtime;
pub mod ui;

pub use error::{FacetError, FacetResult};
