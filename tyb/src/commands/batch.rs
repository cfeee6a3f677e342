use std::path::{Path, PathBuf};

use clap::Args;
use eyre::{Result, bail};
use tybundle_config::{BundleToml, MANIFEST_FILE, parse_entries};

use super::UnwrapOrExit;
use crate::{
    ops::{self, BatchOptions, BatchTarget},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct BatchCommand {
    /// Entry as `path:Type` or `path:Type:Alias`; repeatable, comma-separated
    #[arg(short, long = "entry")]
    pub entries: Vec<String>,

    /// Write one `{Alias or Type}.d.ts` per entry into this directory
    #[arg(long, conflicts_with = "merged")]
    pub output_dir: Option<PathBuf>,

    /// Write every entry into this one file
    #[arg(long)]
    pub merged: Option<PathBuf>,

    /// Project root (defaults to the nearest directory with tsconfig.json,
    /// package.json or .git)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Path to tyb.toml (read by default when no entries are given)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl BatchCommand {
    pub fn run(&self) -> Result<()> {
        let manifest = self
            .manifest_path()
            .map(|path| BundleToml::open(path).unwrap_or_exit());

        let mut entries = manifest
            .as_ref()
            .map(BundleToml::entry_points)
            .unwrap_or_default();
        entries.extend(parse_entries(&self.entries));
        if entries.is_empty() {
            bail!("no entries given; pass --entry or a {} with [[entries]]", MANIFEST_FILE);
        }

        let target = if let Some(file) = &self.merged {
            BatchTarget::Merged(file.clone())
        } else if let Some(dir) = &self.output_dir {
            BatchTarget::Directory(dir.clone())
        } else if let Some(file) = manifest.as_ref().and_then(BundleToml::merged) {
            BatchTarget::Merged(file)
        } else if let Some(dir) = manifest.as_ref().and_then(BundleToml::output_dir) {
            BatchTarget::Directory(dir)
        } else {
            bail!("either --output-dir or --merged is required");
        };
        let root = self
            .root
            .clone()
            .or_else(|| manifest.as_ref().and_then(BundleToml::root));

        let report = ops::batch(BatchOptions {
            entries,
            target,
            root: root.as_deref(),
        })?;
        report.render(&mut TerminalOutput::new());

        if report.all_failed {
            std::process::exit(1);
        }
        Ok(())
    }

    /// `--config`, or `./tyb.toml` when no entries were passed.
    fn manifest_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        let default = Path::new(MANIFEST_FILE);
        (self.entries.is_empty() && default.is_file()).then(|| default.to_path_buf())
    }
}
