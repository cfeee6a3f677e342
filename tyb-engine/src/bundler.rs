//! Bundle requests over one shared collector.

use std::path::Path;

use eyre::Result;
use tracing::info;
use tybundle_config::{EntryPoint, ProjectConfig};
use tybundle_core::FinalNameAssignment;

use crate::{
    collector::Collector,
    parser::{DeclarationParser, TypeScriptParser},
    pipeline::{Diagnostic, Pipeline},
    resolver::ModuleResolver,
};

/// Result of one bundle request.
#[derive(Debug, Clone, Default)]
pub struct BundleOutput {
    /// Bundle text; empty when none of the requested types was found.
    pub text: String,
    pub final_names: FinalNameAssignment,
    /// Entries whose type could not be found.
    pub missing: Vec<EntryPoint>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BundleOutput {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn declaration_count(&self) -> usize {
        self.final_names.len()
    }
}

/// Runs bundle requests against one project.
///
/// Parsed files and their scopes are kept between requests, so every file
/// is parsed at most once per `Bundler`. Final names are computed from
/// scratch on every request.
pub struct Bundler {
    collector: Collector,
    pipeline: Pipeline,
}

impl Bundler {
    pub fn new(config: &ProjectConfig, parser: impl DeclarationParser + 'static) -> Self {
        Self {
            collector: Collector::new(ModuleResolver::new(config), parser),
            pipeline: Pipeline::new(),
        }
    }

    /// A bundler using the tree-sitter TypeScript parser.
    pub fn with_typescript(config: &ProjectConfig) -> Self {
        Self::new(config, TypeScriptParser::new())
    }

    /// Bundle `type_name` as declared in, or imported into, `entry`.
    pub fn bundle(&mut self, entry: &Path, type_name: &str) -> Result<BundleOutput> {
        self.bundle_entries(&[EntryPoint::new(entry, type_name)])
    }

    /// Bundle several entries into one text with a single name assignment.
    pub fn bundle_entries(&mut self, entries: &[EntryPoint]) -> Result<BundleOutput> {
        let ctx = self.pipeline.run(&mut self.collector, entries.to_vec())?;

        let output = BundleOutput {
            text: ctx.output.unwrap_or_default(),
            final_names: ctx.final_names.unwrap_or_default(),
            missing: ctx.missing,
            diagnostics: ctx.diagnostics,
        };
        info!(
            entries = entries.len(),
            declarations = output.declaration_count(),
            missing = output.missing.len(),
            "bundle complete"
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{CountingParser, Fixture};

    #[test]
    fn test_bundle_not_found_is_empty() {
        let fixture = Fixture::new().file("a.ts", "type A = 1;");
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));

        let output = bundler
            .bundle(&fixture.path("a.ts"), "Missing")
            .expect("bundle should succeed");

        assert!(output.is_empty());
        assert_eq!(output.declaration_count(), 0);
        assert_eq!(output.missing.len(), 1);
    }

    #[test]
    fn test_repeated_requests_reuse_parsed_files() {
        let fixture = Fixture::new()
            .file("a.ts", "import { B } from './b';\nexport type A = B;\nexport type C = B;")
            .file("b.ts", "export type B = 1;");
        let (parser, counter) = CountingParser::new(TypeScriptParser::new());
        let mut bundler = Bundler::new(&ProjectConfig::new(fixture.root()), parser);

        let first = bundler.bundle(&fixture.path("a.ts"), "A").unwrap();
        let second = bundler.bundle(&fixture.path("a.ts"), "C").unwrap();

        assert_eq!(first.text, "export type A = B;\n\nexport type B = 1;");
        assert_eq!(second.text, "export type B = 1;\n\nexport type C = B;");
        assert_eq!(counter.total(), 2);
    }

    #[test]
    fn test_entries_share_one_assignment() {
        let fixture = Fixture::new()
            .file("a.ts", "export type T = 1;")
            .file("b.ts", "export type T = 2;");
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));

        let output = bundler
            .bundle_entries(&[
                EntryPoint::new(fixture.path("a.ts"), "T"),
                EntryPoint::new(fixture.path("b.ts"), "T"),
            ])
            .unwrap();

        assert_eq!(output.text, "export type T = 1;\n\nexport type TFromB = 2;");
    }
}
