//! Bundling engine for TypeScript type declarations.
//!
//! Given an entry file and a type name, the engine collects the declaration
//! and everything it transitively references across files, assigns every
//! kept declaration a unique name and emits them as one self-contained text.
//!
//! # Module Organization
//!
//! - [`ambient`] - project `.d.ts` discovery for ambient declarations
//! - [`resolver`] - module specifier resolution (relative paths, tsconfig aliases)
//! - [`parser`] - declaration parsing ([`DeclarationParser`], tree-sitter implementation)
//! - [`registry`] - the declaration table
//! - [`collector`] - per-file scopes and import/export graph traversal
//! - [`naming`] - reachability and final name assignment
//! - [`rewrite`] - reference rewriting and emission
//! - [`pipeline`] - phases over a bundle request, diagnostics
//! - [`bundler`] / [`batch`] - single, merged and per-entry bundling
//! - [`testing`] - test utilities (feature-gated)

pub mod ambient;
pub mod batch;
pub mod bundler;
pub mod collector;
pub mod naming;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod rewrite;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batch::{BatchFile, BatchReport, bundle_to_file, bundle_to_files};
pub use bundler::{BundleOutput, Bundler};
pub use collector::Collector;
pub use parser::{DeclarationParser, ParseError, TypeScriptParser};
pub use pipeline::{Diagnostic, Pipeline, Severity};
pub use registry::Registry;
pub use resolver::{ModuleResolver, ResolvedModule};
