//! Emit phase - renders the bundle text.

use eyre::Result;

use crate::{
    pipeline::{BundleContext, Phase},
    rewrite::emit,
};

/// Phase that rewrites every kept declaration to its final names and joins
/// them in final-name order.
///
/// This phase must run after `ResolvePhase`.
pub struct EmitPhase;

impl Phase for EmitPhase {
    fn name(&self) -> &'static str {
        "emit"
    }


    fn run(&self, ctx: &mut BundleContext<'_>) -> Result<()> {
        let names = ctx.final_names.as_ref().ok_or_else(|| {
            eyre::eyre!("final names not set - EmitPhase must run after ResolvePhase")
        })?;

        let text = emit(ctx.collector.registry(), ctx.collector.scopes(), names);
        ctx.output = Some(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tybundle_config::ProjectConfig;

    use super::*;
    use crate::{collector::Collector, parser::TypeScriptParser, resolver::ModuleResolver};

    #[test]
    fn test_emit_phase_requires_final_names() {
        let mut collector = Collector::new(
            ModuleResolver::new(&ProjectConfig::new("/p")),
            TypeScriptParser::new(),
        );
        let mut ctx = BundleContext::new(&mut collector, Vec::new());

        assert!(EmitPhase.run(&mut ctx).is_err());
        assert!(ctx.output.is_none());
    }
}
