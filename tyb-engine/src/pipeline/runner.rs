//! Pipeline orchestrator.

use eyre::{Result, WrapErr};
use tracing::debug;
use tybundle_config::EntryPoint;

use super::{
    BundleContext, Phase,
    phases::{CollectPhase, EmitPhase, ResolvePhase},
};
use crate::collector::Collector;

/// The bundling pipeline orchestrator.
///
/// Runs collect, resolve and emit over one bundle request.
///
/// # Example
///
/// ```ignore
/// let ctx = Pipeline::new().run(&mut collector, entries)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            phases: vec![
                Box::new(CollectPhase),
                Box::new(ResolvePhase),
                Box::new(EmitPhase),
            ],
        }
    }

    /// Run every phase for `entries`, sharing `collector`'s caches.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run<'a>(
        &self,
        collector: &'a mut Collector,
        entries: Vec<EntryPoint>,
    ) -> Result<BundleContext<'a>> {
        let mut ctx = BundleContext::new(collector, entries);

        for phase in &self.phases {
            debug!(phase = phase.name(), "running phase");
            phase
                .run(&mut ctx)
                .wrap_err_with(|| format!("phase '{}' failed", phase.name()))?;
        }

        Ok(ctx)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
