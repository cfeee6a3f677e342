//! Final name assignment.
//!
//! Every declaration kept in a bundle gets exactly one output name. Names
//! are decided by these rules, each later rule overriding earlier ones:
//!
//! 1. the declared name;
//! 2. a different local name some file binds the declaration to, unless the
//!    declaration is a default export anywhere;
//! 3. a namespace-qualified binding (`ns.Foo`) flattened to `ns_Foo`;
//! 4. the alias requested for an entry point;
//! 5. collisions: within each group sharing a name, the first id (by path,
//!    then declared name) keeps it and the others become
//!    `{Declared}From{FileStem}`, suffixed `_1`, `_2`, ... while still taken.

use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    path::PathBuf,
};

use tracing::trace;
use tybundle_core::{
    DEFAULT_EXPORT, DeclId, FileScope, FinalNameAssignment, ResolutionMaps, file_stem_pascal_case,
};

use crate::registry::Registry;

/// Look `name` up in `scope`. A qualified name that is not bound as a whole
/// falls back to its longest bound prefix (`Status.Active` -> `Status`).
///
/// Returns the id together with the part of `name` it matched.
pub fn lookup<'s, 'n>(scope: &'s FileScope, name: &'n str) -> Option<(&'s DeclId, &'n str)> {
    let mut candidate = name;
    loop {
        if let Some(id) = scope.get(candidate) {
            return Some((id, candidate));
        }
        let (head, _) = candidate.rsplit_once('.')?;
        candidate = head;
    }
}

/// The declarations reachable from `roots` through the references of each
/// declaration, resolved in its own file's scope.
pub fn reachable(
    registry: &Registry,
    scopes: &ResolutionMaps,
    roots: &[DeclId],
) -> BTreeSet<DeclId> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<DeclId> = roots
        .iter()
        .filter(|id| registry.contains(id))
        .cloned()
        .collect();

    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let Some(decl) = registry.get(&id) else {
            continue;
        };
        let Some(scope) = scopes.get(decl.file()) else {
            continue;
        };
        for reference in &decl.references {
            if let Some((target, _)) = lookup(scope, reference)
                && registry.contains(target)
                && !seen.contains(target)
            {
                stack.push(target.clone());
            }
        }
    }

    seen
}

/// Scopes in path order, so alias preference does not depend on the order
/// files were visited in.
fn sorted_scopes(scopes: &ResolutionMaps) -> Vec<(&PathBuf, &FileScope)> {
    let mut sorted: Vec<_> = scopes.iter().collect();
    sorted.sort_by(|(a, _), (b, _)| a.as_os_str().cmp(b.as_os_str()));
    sorted
}

/// Assign a final, unique name to every id in `keep`.
pub fn resolve_names(
    registry: &Registry,
    scopes: &ResolutionMaps,
    keep: &BTreeSet<DeclId>,
    entry_aliases: &BTreeMap<DeclId, String>,
) -> FinalNameAssignment {
    let mut names: FinalNameAssignment = keep
        .iter()
        .filter(|id| registry.contains(id))
        .map(|id| (id.clone(), id.name.clone()))
        .collect();

    let default_targets: HashSet<&DeclId> = scopes
        .values()
        .filter_map(|scope| scope.get(DEFAULT_EXPORT))
        .collect();
    let scopes = sorted_scopes(scopes);

    // Alias preference
    for (_, scope) in &scopes {
        for (local, id) in scope.iter() {
            if local == DEFAULT_EXPORT || local.contains('.') || default_targets.contains(id) {
                continue;
            }
            if let Some(name) = names.get_mut(id)
                && *local != id.name
            {
                trace!(id = %id, alias = %local, "preferring alias");
                *name = local.clone();
            }
        }
    }

    // Namespace flattening
    for (_, scope) in &scopes {
        for (local, id) in scope.iter() {
            if local.contains('.')
                && let Some(name) = names.get_mut(id)
            {
                *name = local.replace('.', "_");
            }
        }
    }

    // Entry aliases
    for (id, alias) in entry_aliases {
        if let Some(name) = names.get_mut(id) {
            *name = alias.clone();
        }
    }

    resolve_collisions(&mut names);
    names
}

fn resolve_collisions(names: &mut FinalNameAssignment) {
    // Ids iterate in order, so each group is already sorted.
    let mut groups: BTreeMap<String, Vec<DeclId>> = BTreeMap::new();
    for (id, name) in names.iter() {
        groups.entry(name.clone()).or_default().push(id.clone());
    }
    let mut taken: HashSet<String> = groups.keys().cloned().collect();

    for ids in groups.into_values().filter(|ids| ids.len() > 1) {
        for id in ids.into_iter().skip(1) {
            let base = format!("{}From{}", id.name, file_stem_pascal_case(&id.file));
            let mut candidate = base.clone();
            let mut suffix = 1;
            while taken.contains(&candidate) {
                candidate = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            trace!(id = %id, name = %candidate, "renamed on collision");
            taken.insert(candidate.clone());
            names.insert(id, candidate);
        }
    }
}
