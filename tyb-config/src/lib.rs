//! Configuration layer for tybundle.
//!
//! Discovers the project root, reads path aliases from `tsconfig.json`,
//! parses batch entry strings and loads the optional `tyb.toml` manifest.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod entry;
mod error;
mod manifest;
mod project;
mod tsconfig;
mod validate;

pub use entry::{EntryPoint, parse_entries};
pub use error::{Error, Result, SourceContext};
pub use manifest::{BundleSection, BundleToml, EntrySection, MANIFEST_FILE, Manifest};
pub use project::{DEFAULT_EXTENSIONS, ProjectConfig, absolute, find_project_root};
pub use tsconfig::{PathMapping, ResolvedTsconfig, load_tsconfig, sanitize_jsonc};

/// Alias used where the error is surfaced to callers as a configuration
/// problem scoped to one entry.
pub type ConfigError = Error;
