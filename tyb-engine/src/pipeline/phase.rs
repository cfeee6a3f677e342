//! Pipeline phase trait.

use eyre::Result;

use super::BundleContext;

/// A phase in the bundling pipeline.
///
/// Phases run in order and share one [`BundleContext`]: `CollectPhase`,
/// then `ResolvePhase`, then `EmitPhase`.
pub trait Phase: Send + Sync {
    /// The name of this phase, used in diagnostics and logs.
    fn name(&self) -> &'static str;

    /// Run this phase on the bundle context.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails fatally. Non-fatal issues should
    /// be recorded as diagnostics instead.
    fn run(&self, ctx: &mut BundleContext<'_>) -> Result<()>;
}
