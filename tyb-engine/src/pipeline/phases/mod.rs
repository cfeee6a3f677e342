//! Built-in pipeline phases.
//!
//! - [`CollectPhase`] - parses entry files and their dependencies, finds the
//!   requested declarations
//! - [`ResolvePhase`] - computes the reachable set and final names
//! - [`EmitPhase`] - rewrites and joins the kept declarations

mod collect;
mod emit;
mod resolve;

pub use collect::CollectPhase;
pub use emit::EmitPhase;
pub use resolve::ResolvePhase;
