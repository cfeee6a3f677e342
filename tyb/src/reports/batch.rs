//! Batch command report data structures.

use std::path::PathBuf;

use tybundle_core::WriteResult;

use super::output::{Output, Report};

/// A file produced by a batch run.
#[derive(Debug)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub result: WriteResult,
    pub declarations: usize,
}

/// Report data from a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<WrittenFile>,
    /// Entries whose type could not be found.
    pub not_found: Vec<String>,
    /// Rendered configuration errors, one per rejected entry.
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Every entry was rejected.
    pub all_failed: bool,
}

impl Report for BatchSummary {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.warning(error);
        }
        for warning in &self.warnings {
            out.warning(warning);
        }

        if !self.written.is_empty() {
            out.section(&format!("Bundled ({})", self.written.len()));
            for file in &self.written {
                let marker = match file.result {
                    WriteResult::Written => "",
                    WriteResult::Unchanged => " (unchanged)",
                };
                out.added_item(&format!(
                    "{} - {} declaration{}{}",
                    file.path.display(),
                    file.declarations,
                    if file.declarations == 1 { "" } else { "s" },
                    marker
                ));
            }
        }

        if !self.not_found.is_empty() {
            out.newline();
            out.section("Not found");
            for entry in &self.not_found {
                out.list_item(entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordingOutput;

    #[test]
    fn test_render_written_and_missing() {
        let summary = BatchSummary {
            written: vec![
                WrittenFile {
                    path: PathBuf::from("types/UserDTO.d.ts"),
                    result: WriteResult::Written,
                    declarations: 1,
                },
                WrittenFile {
                    path: PathBuf::from("types/Post.d.ts"),
                    result: WriteResult::Unchanged,
                    declarations: 2,
                },
            ],
            not_found: vec!["src/models.ts:Gone".to_string()],
            ..Default::default()
        };
        let mut out = RecordingOutput::default();

        summary.render(&mut out);

        assert_eq!(
            out.stdout,
            [
                "Bundled (2):",
                "  + types/UserDTO.d.ts - 1 declaration",
                "  + types/Post.d.ts - 2 declarations (unchanged)",
                "",
                "Not found:",
                "  - src/models.ts:Gone",
            ]
        );
        assert!(out.stderr.is_empty());
    }
}
