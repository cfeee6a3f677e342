//! Bundle command report data structures.

use std::path::PathBuf;

use tybundle_core::WriteResult;

use super::output::{Output, Report};

/// Where the bundle text went.
#[derive(Debug)]
pub enum BundleDestination {
    Stdout,
    File { path: PathBuf, result: WriteResult },
}

/// Report data from bundling one type.
#[derive(Debug)]
pub struct BundleReport {
    pub entry: PathBuf,
    pub type_name: String,
    pub declarations: usize,
    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,
    /// Bundle text; empty when the type was not found.
    pub text: String,
    pub destination: BundleDestination,
}

impl BundleReport {
    pub fn is_not_found(&self) -> bool {
        self.text.is_empty()
    }
}

impl Report for BundleReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        if self.is_not_found() {
            out.warning(&format!(
                "type '{}' not found from {}",
                self.type_name,
                self.entry.display()
            ));
            return;
        }

        match &self.destination {
            BundleDestination::Stdout => out.preformatted(&self.text),
            BundleDestination::File { path, result } => {
                let label = match result {
                    WriteResult::Written => "Wrote",
                    WriteResult::Unchanged => "Unchanged",
                };
                out.key_value(label, &path.display().to_string());
                out.key_value("Declarations", &self.declarations.to_string());
            }
        }
    }
}
