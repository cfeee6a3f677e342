//! Bundle context passed through pipeline phases.

use std::collections::{BTreeMap, BTreeSet};

use tybundle_config::EntryPoint;
use tybundle_core::{DeclId, FinalNameAssignment};

use super::diagnostic::Diagnostic;
use crate::collector::Collector;

/// State of one bundle request as it moves through the phases.
///
/// The collector is borrowed, not owned: its registry and scopes outlive a
/// single request so files are parsed once across requests.
pub struct BundleContext<'a> {
    pub collector: &'a mut Collector,
    /// The requested entries, in request order.
    pub entries: Vec<EntryPoint>,
    /// Ids of the entries that were found (populated by CollectPhase).
    pub roots: Vec<DeclId>,
    /// Aliases requested for found entries.
    pub entry_aliases: BTreeMap<DeclId, String>,
    /// Entries whose type could not be found.
    pub missing: Vec<EntryPoint>,
    /// Declarations kept in the bundle (populated by ResolvePhase).
    pub reachable: BTreeSet<DeclId>,
    /// Final names of the kept declarations (populated by ResolvePhase).
    pub final_names: Option<FinalNameAssignment>,
    /// Bundle text (populated by EmitPhase).
    pub output: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> BundleContext<'a> {
    pub fn new(collector: &'a mut Collector, entries: Vec<EntryPoint>) -> Self {
        Self {
            collector,
            entries,
            roots: Vec::new(),
            entry_aliases: BTreeMap::new(),
            missing: Vec::new(),
            reachable: BTreeSet::new(),
            final_names: None,
            output: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Move the collector's pending diagnostics onto the context.
    pub fn drain_collector_diagnostics(&mut self) {
        let drained = self.collector.take_diagnostics();
        self.diagnostics.extend(drained);
    }
}
