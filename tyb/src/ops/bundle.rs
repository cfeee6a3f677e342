//! Bundle operation - one type from one entry file.

use std::path::Path;

use eyre::{Context, Result};
use tracing::{debug, info};
use tybundle_config::ProjectConfig;
use tybundle_core::File;
use tybundle_engine::Bundler;

use super::user_warnings;
use crate::reports::{BundleDestination, BundleReport};

/// Options for the bundle operation.
pub struct BundleOptions<'a> {
    pub input: &'a Path,
    pub type_name: &'a str,
    /// Output file; stdout when absent.
    pub output: Option<&'a Path>,
    pub root: Option<&'a Path>,
}

/// Execute the bundle operation.
///
/// A type that cannot be found is not an error: the report carries no text
/// and nothing is written.
pub fn bundle(opts: BundleOptions) -> Result<BundleReport> {
    let config = ProjectConfig::discover(opts.input, opts.root);
    debug!(root = %config.root.display(), aliases = config.paths.len(), "project settled");
    let mut bundler = Bundler::with_typescript(&config);
    let output = bundler
        .bundle(opts.input, opts.type_name)
        .wrap_err("Bundling failed")?;

    let destination = match opts.output {
        Some(path) if !output.is_empty() => {
            let result = File::new(path, format!("{}\n", output.text))
                .write()
                .wrap_err("Failed to write bundle")?;
            info!(path = %path.display(), ?result, "bundle written");
            BundleDestination::File {
                path: path.to_path_buf(),
                result,
            }
        }
        _ => BundleDestination::Stdout,
    };

    Ok(BundleReport {
        entry: opts.input.to_path_buf(),
        type_name: opts.type_name.to_string(),
        declarations: output.declaration_count(),
        warnings: user_warnings(&output.diagnostics),
        text: output.text,
        destination,
    })
}
