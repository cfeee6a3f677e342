//! Core types and utilities for tybundle.
//!
//! This crate provides the data model shared by the configuration layer,
//! the bundling engine and the command line front end.

mod file;
mod types;
mod utils;

// File operations
pub use file::{File, WriteResult};
// Data model
pub use types::{
    DEFAULT_EXPORT, DeclId, DeclKind, Declaration, FileScope, FinalNameAssignment, ReferenceSpan,
    ResolutionMaps,
};
// String utilities
pub use utils::{file_stem_pascal_case, sanitize_file_name, to_pascal_case};
