mod batch;
mod bundle;
mod completions;

use batch::BatchCommand;
use bundle::BundleCommand;
use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;

/// Extension trait for exiting on configuration errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for tybundle_config::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => {
                eprintln!("{:?}", miette::Report::new(*e));
                std::process::exit(1);
            }
        }
    }
}

#[derive(Parser)]
#[command(name = "tyb")]
#[command(version)]
#[command(about = "Bundle TypeScript declarations with everything they depend on")]
pub(crate) struct Cli {
    /// Log what the bundler is doing (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Bundle(cmd) => cmd.run(),
            Commands::Batch(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Bundle one type from an entry file
    Bundle(BundleCommand),

    /// Bundle many entries, one file each or merged
    Batch(BatchCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
