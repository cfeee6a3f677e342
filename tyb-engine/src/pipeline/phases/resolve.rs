//! Resolve phase - decides what is kept and what it is called.

use std::path::PathBuf;

use eyre::Result;
use tracing::debug;

use crate::{
    naming::{reachable, resolve_names},
    pipeline::{BundleContext, Phase},
};

/// Phase that computes the declarations reachable from the entry roots and
/// assigns each a unique final name.
///
/// This phase must run after `CollectPhase`.
pub struct ResolvePhase;

impl Phase for ResolvePhase {
    fn name(&self) -> &'static str {
        "resolve"
    }


    fn run(&self, ctx: &mut BundleContext<'_>) -> Result<()> {
        // Names depend only on the files this request reaches.
        let files: Vec<PathBuf> = ctx.entries.iter().map(|e| e.file.clone()).collect();
        let scopes = ctx.collector.scopes_from(&files);
        let registry = ctx.collector.registry();

        let keep = reachable(registry, &scopes, &ctx.roots);
        let names = resolve_names(registry, &scopes, &keep, &ctx.entry_aliases);
        debug!(
            files = scopes.len(),
            declarations = names.len(),
            "resolved final names"
        );

        ctx.reachable = keep;
        ctx.final_names = Some(names);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tybundle_config::{EntryPoint, ProjectConfig};
    use tybundle_core::DeclId;

    use super::*;
    use crate::{
        collector::Collector, parser::TypeScriptParser, pipeline::phases::CollectPhase,
        resolver::ModuleResolver, testing::Fixture,
    };

    #[test]
    fn test_names_ignore_files_outside_the_request() {
        let fixture = Fixture::new()
            .file("a.ts", "export type Id = string;\nexport interface User { id: Id }")
            .file("b.ts", "import { Id as Key } from './a';\nexport type Post = Key;");
        let mut collector = Collector::new(
            ModuleResolver::new(&ProjectConfig::new(fixture.root())),
            TypeScriptParser::new(),
        );
        collector.collect(&fixture.path("b.ts"));
        let entries = vec![EntryPoint::new(fixture.path("a.ts"), "User")];
        let mut ctx = BundleContext::new(&mut collector, entries);

        CollectPhase.run(&mut ctx).unwrap();
        ResolvePhase.run(&mut ctx).unwrap();

        let names = ctx.final_names.unwrap();
        assert_eq!(names[&DeclId::new(fixture.path("a.ts"), "Id")], "Id");
        assert_eq!(ctx.reachable.len(), 2);
    }
}
