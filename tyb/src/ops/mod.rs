//! Core operations.
//!
//! This module contains the business logic for tyb commands,
//! separated from CLI argument parsing and output rendering.

pub mod batch;
pub mod bundle;

pub use batch::{BatchOptions, BatchTarget, batch};
pub use bundle::{BundleOptions, bundle};

use tybundle_engine::{Diagnostic, Severity};

/// Render the diagnostics worth showing a user: warnings and errors.
fn user_warnings(diagnostics: &[Diagnostic]) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|d| !matches!(d.severity, Severity::Info))
        .map(|d| match &d.location {
            Some(location) => format!("{} ({})", d.message, location),
            None => d.message.clone(),
        })
        .collect()
}
