//! Collect phase - builds scopes for every entry file.

use eyre::Result;
use tracing::debug;

use crate::pipeline::{BundleContext, Diagnostic, Phase};

/// Phase that collects each entry file (and, recursively, its imports) and
/// looks the requested type up in the entry file's scope.
///
/// A type that is not found is not an error: the entry is recorded in
/// `missing` with an info diagnostic and contributes nothing to the bundle.
pub struct CollectPhase;

impl Phase for CollectPhase {
    fn name(&self) -> &'static str {
        "collect"
    }


    fn run(&self, ctx: &mut BundleContext<'_>) -> Result<()> {
        let entries = ctx.entries.clone();
        for entry in entries {
            let scope = ctx.collector.collect(&entry.file);
            let found = scope
                .get(&entry.type_name)
                .filter(|id| ctx.collector.registry().contains(id))
                .cloned();

            match found {
                Some(id) => {
                    debug!(entry = %entry, id = %id, "found entry declaration");
                    if let Some(alias) = &entry.alias {
                        ctx.entry_aliases.insert(id.clone(), alias.clone());
                    }
                    if !ctx.roots.contains(&id) {
                        ctx.roots.push(id);
                    }
                }
                None => {
                    ctx.add_diagnostic(
                        Diagnostic::info(
                            self.name(),
                            format!("type '{}' not found", entry.type_name),
                        )
                        .at(entry.file.display().to_string()),
                    );
                    ctx.missing.push(entry);
                }
            }
        }

        ctx.drain_collector_diagnostics();
        Ok(())
    }
}
