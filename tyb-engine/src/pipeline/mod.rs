//! Bundling pipeline.
//!
//! A [`Pipeline`] runs the bundling phases over a [`BundleContext`]:
//!
//! - `collect`: parse the entry files and everything they import, and find
//!   the requested declarations
//! - `resolve`: compute the reachable set and the final name of each
//!   declaration in it
//! - `emit`: rewrite the kept declarations and join them into bundle text
//!
//! Soft failures are recorded as [`Diagnostic`]s on the context. A phase
//! only returns `Err` when the pipeline cannot continue.
//!
//! # Example
//!
//! ```ignore
//! use tybundle_engine::pipeline::Pipeline;
//!
//! let ctx = Pipeline::new().run(&mut collector, entries)?;
//! for diag in &ctx.diagnostics {
//!     eprintln!("{}", diag);
//! }
//! println!("{}", ctx.output.unwrap_or_default());
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod runner;

pub use context::BundleContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use runner::Pipeline;
