use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use tybundle_config::EntryPoint;

use super::UnwrapOrExit;
use crate::{
    ops::{self, BundleOptions},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct BundleCommand {
    /// Entry file declaring or importing the type
    #[arg(short, long)]
    pub input: PathBuf,

    /// Name of the type, interface or enum to bundle
    #[arg(short = 't', long = "type")]
    pub type_name: String,

    /// Write the bundle here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Project root (defaults to the nearest directory with tsconfig.json,
    /// package.json or .git)
    #[arg(short, long)]
    pub root: Option<PathBuf>,
}

impl BundleCommand {
    pub fn run(&self) -> Result<()> {
        EntryPoint::new(&self.input, &self.type_name)
            .validate()
            .unwrap_or_exit();

        let report = ops::bundle(BundleOptions {
            input: &self.input,
            type_name: &self.type_name,
            output: self.output.as_deref(),
            root: self.root.as_deref(),
        })?;
        report.render(&mut TerminalOutput::new());

        Ok(())
    }
}
