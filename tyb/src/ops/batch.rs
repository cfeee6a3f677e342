//! Batch operation - many entries, one project.

use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use tracing::{debug, info};
use tybundle_config::{EntryPoint, ProjectConfig};
use tybundle_engine::{Bundler, bundle_to_file, bundle_to_files};

use super::user_warnings;
use crate::reports::{BatchSummary, WrittenFile};

/// Where a batch run writes.
#[derive(Debug, Clone)]
pub enum BatchTarget {
    /// One `{Alias or Type}.d.ts` per entry.
    Directory(PathBuf),
    /// One file for every entry.
    Merged(PathBuf),
}

/// Options for the batch operation.
pub struct BatchOptions<'a> {
    pub entries: Vec<tybundle_config::Result<EntryPoint>>,
    pub target: BatchTarget,
    pub root: Option<&'a Path>,
}

/// Execute the batch operation.
///
/// The project is discovered from the first valid entry unless a root is
/// given. Malformed entries are reported and skipped.
pub fn batch(opts: BatchOptions) -> Result<BatchSummary> {
    let anchor = opts
        .entries
        .iter()
        .find_map(|entry| entry.as_ref().ok())
        .map(|entry| entry.file.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::discover(&anchor, opts.root);
    debug!(root = %config.root.display(), target = ?opts.target, "project settled");
    let mut bundler = Bundler::with_typescript(&config);

    let report = match &opts.target {
        BatchTarget::Directory(dir) => bundle_to_files(&mut bundler, opts.entries, dir),
        BatchTarget::Merged(file) => bundle_to_file(&mut bundler, opts.entries, file),
    }
    .wrap_err("Batch bundling failed")?;

    info!(
        written = report.written.len(),
        not_found = report.not_found.len(),
        errors = report.errors.len(),
        "batch complete"
    );
    let all_failed = report.all_failed();
    Ok(BatchSummary {
        written: report
            .written
            .iter()
            .map(|file| WrittenFile {
                path: file.path.clone(),
                result: file.result,
                declarations: file.declarations,
            })
            .collect(),
        not_found: report.not_found.iter().map(ToString::to_string).collect(),
        errors: report
            .errors
            .into_iter()
            .map(|e| format!("{:?}", miette::Report::new(e)))
            .collect(),
        warnings: user_warnings(&report.diagnostics),
        all_failed,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tybundle_config::parse_entries;

    use super::*;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(
            dir.path().join("models.ts"),
            "export interface User { id: string }\nexport interface Post { author: User }",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_batch_into_directory() {
        let dir = project();
        let models = dir.path().join("models.ts");
        let entries = parse_entries([format!(
            "{0}:User:UserDTO,{0}:Post,{0}:Gone",
            models.display()
        )]);
        let out = dir.path().join("types");

        let summary = batch(BatchOptions {
            entries,
            target: BatchTarget::Directory(out.clone()),
            root: None,
        })
        .unwrap();

        assert_eq!(summary.written.len(), 2);
        assert_eq!(summary.not_found.len(), 1);
        assert!(out.join("UserDTO.d.ts").is_file());
        assert!(out.join("Post.d.ts").is_file());
        assert!(!summary.all_failed);
    }

    #[test]
    fn test_batch_merged_with_bad_entry() {
        let dir = project();
        let models = dir.path().join("models.ts");
        let entries = parse_entries([format!("{}:User", models.display()), "bad".to_string()]);
        let target = dir.path().join("all.d.ts");

        let summary = batch(BatchOptions {
            entries,
            target: BatchTarget::Merged(target.clone()),
            root: Some(dir.path()),
        })
        .unwrap();

        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.written.len(), 1);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "export interface User { id: string }\n"
        );
    }
}
