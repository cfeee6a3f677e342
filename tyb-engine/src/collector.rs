//! Dependency collection.
//!
//! Builds the [`FileScope`] of a file and, recursively, of every file it
//! imports from or re-exports. Scopes are memoised in [`ResolutionMaps`];
//! an empty placeholder is stored before a file's imports are followed so
//! cyclic imports terminate.
//!
//! References that nothing in a file's scope provides fall back to the
//! declarations of the project's script `.d.ts` files (files without a
//! top-level import or export). Those files are scanned once per collector,
//! on first need, and the first file by path wins a name.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    path::{Path, PathBuf},
};

use tracing::{debug, trace, warn};
use tybundle_config::absolute;
use tybundle_core::{DEFAULT_EXPORT, DeclId, FileScope, ResolutionMaps};

use crate::{
    ambient::declaration_files,
    naming::lookup,
    parser::{DeclarationParser, ExportRecord, ImportKind, ImportRecord, ParsedFile},
    pipeline::Diagnostic,
    registry::Registry,
    resolver::{ModuleResolver, ResolvedModule, normalize_path},
};

const PHASE: &str = "collect";

/// Owns the declaration registry and the per-file scopes for one bundling
/// session. Files are parsed at most once per collector.
pub struct Collector {
    resolver: ModuleResolver,
    parser: Box<dyn DeclarationParser>,
    registry: Registry,
    scopes: ResolutionMaps,
    /// Files each file was resolved against: imports, re-exports and
    /// ambient declaration files.
    dependencies: HashMap<PathBuf, BTreeSet<PathBuf>>,
    /// Parsed files without a top-level import or export.
    scripts: HashSet<PathBuf>,
    /// Script declarations by name, built on first use.
    ambient: Option<FileScope>,
    diagnostics: Vec<Diagnostic>,
}

impl Collector {
    pub fn new(resolver: ModuleResolver, parser: impl DeclarationParser + 'static) -> Self {
        Self {
            resolver,
            parser: Box::new(parser),
            registry: Registry::new(),
            scopes: ResolutionMaps::new(),
            dependencies: HashMap::new(),
            scripts: HashSet::new(),
            ambient: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scopes(&self) -> &ResolutionMaps {
        &self.scopes
    }

    pub fn scope(&self, path: &Path) -> Option<&FileScope> {
        self.scopes.get(path)
    }

    /// The scopes of `files` and of every file they depend on, directly or
    /// through other files. Files not collected yet are skipped.
    pub fn scopes_from(&self, files: &[PathBuf]) -> ResolutionMaps {
        let mut reached = ResolutionMaps::new();
        let mut stack: Vec<PathBuf> = files.iter().rev().map(|f| Self::file_key(f)).collect();

        while let Some(path) = stack.pop() {
            if reached.contains_key(&path) {
                continue;
            }
            let Some(scope) = self.scopes.get(&path) else {
                continue;
            };
            if let Some(deps) = self.dependencies.get(&path) {
                stack.extend(deps.iter().rev().cloned());
            }
            reached.insert(path, scope.clone());
        }
        reached
    }

    /// Drain the diagnostics recorded since the last call.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Canonical key for a file: absolute and lexically normalised.
    pub fn file_key(path: &Path) -> PathBuf {
        normalize_path(&absolute(path))
    }

    /// Collect `path` and everything it depends on, returning its scope.
    pub fn collect(&mut self, path: &Path) -> FileScope {
        let path = Self::file_key(path);
        self.resolve_file(&path)
    }

    fn resolve_file(&mut self, path: &Path) -> FileScope {
        if let Some(scope) = self.scopes.get(path) {
            return scope.clone();
        }
        // Placeholder first: a re-entrant visit sees it and stops.
        self.scopes.insert(path.to_path_buf(), FileScope::new());

        let parsed = match self.parser.parse(path) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "treating unparsable file as empty");
                self.diagnostics.push(
                    Diagnostic::warning(PHASE, e.to_string()).at(path.display().to_string()),
                );
                return FileScope::new();
            }
        };
        debug!(
            file = %path.display(),
            declarations = parsed.declarations.len(),
            imports = parsed.imports.len(),
            exports = parsed.exports.len(),
            "resolving file"
        );

        let ParsedFile {
            declarations,
            imports,
            exports,
            default_export,
        } = parsed;

        let is_script = imports.is_empty()
            && exports.is_empty()
            && default_export.is_none()
            && declarations.iter().all(|d| !d.raw.starts_with("export "));
        if is_script {
            self.scripts.insert(path.to_path_buf());
        }

        let mut scope = FileScope::new();
        let mut references = BTreeSet::new();
        for decl in declarations {
            let decl = decl.into_declaration(path);
            scope
                .entry(decl.name().to_string())
                .or_insert_with(|| decl.id.clone());
            references.extend(decl.references.iter().cloned());
            self.registry.insert(decl);
        }
        // Callers re-entering through a cycle see the local declarations
        // but nothing bound by this file's imports or exports.
        self.scopes.insert(path.to_path_buf(), scope.clone());

        for import in &imports {
            self.bind_import(path, import, &mut scope);
        }
        for export in &exports {
            self.bind_export(path, export, &mut scope);
        }

        if let Some(name) = default_export
            && let Some(id) = scope.get(&name).cloned()
        {
            trace!(file = %path.display(), target = %id, "default export");
            scope.insert(DEFAULT_EXPORT.to_string(), id);
        }

        if has_unresolved(&scope, &references) {
            let bindings = ambient_bindings(self.ambient_index(), &scope, &references);
            self.bind_ambient(path, bindings, &mut scope);
        }

        self.scopes.insert(path.to_path_buf(), scope.clone());
        scope
    }

    fn bind_ambient(
        &mut self,
        path: &Path,
        bindings: Vec<(String, DeclId)>,
        scope: &mut FileScope,
    ) {
        for (name, id) in bindings {
            trace!(
                file = %path.display(),
                name = %name,
                from = %id.file.display(),
                "ambient declaration"
            );
            self.dependencies
                .entry(path.to_path_buf())
                .or_default()
                .insert(id.file.clone());
            scope.insert(name, id);
        }
    }

    fn ambient_index(&mut self) -> &FileScope {
        if self.ambient.is_none() {
            // Installed before scanning so files resolved by the scan do not
            // start another one.
            self.ambient = Some(FileScope::new());
            let index = self.scan_ambient();
            self.ambient = Some(index);
        }
        self.ambient.get_or_insert_with(FileScope::new)
    }

    /// Resolve every declaration file in the project and index the
    /// declarations of the script ones by name.
    fn scan_ambient(&mut self) -> FileScope {
        let files = declaration_files(self.resolver.root());
        debug!(
            root = %self.resolver.root().display(),
            files = files.len(),
            "scanning declaration files"
        );

        let first_new = self.scopes.len();
        let mut index = FileScope::new();
        for file in files {
            let file = Self::file_key(&file);
            let scope = self.resolve_file(&file);
            if !self.scripts.contains(&file) {
                continue;
            }
            for (name, id) in scope {
                if id.file == file && id.name == name {
                    index.entry(name).or_insert(id);
                }
            }
        }

        // Files resolved during the scan saw an empty index.
        let resolved: Vec<PathBuf> = self.scopes.keys().skip(first_new).cloned().collect();
        for file in resolved {
            let Some(mut scope) = self.scopes.get(&file).cloned() else {
                continue;
            };
            let references = self.file_references(&file);
            let bindings = ambient_bindings(&index, &scope, &references);
            if bindings.is_empty() {
                continue;
            }
            self.bind_ambient(&file, bindings, &mut scope);
            self.scopes.insert(file, scope);
        }

        index
    }

    fn file_references(&self, file: &Path) -> BTreeSet<String> {
        self.registry
            .iter()
            .filter(|decl| decl.file() == file)
            .flat_map(|decl| decl.references.iter().cloned())
            .collect()
    }

    /// Resolve a specifier from `from` and return the target's scope, or
    /// `None` when it leaves the project.
    fn target_scope(&mut self, from: &Path, specifier: &str) -> Option<FileScope> {
        match self.resolver.resolve(from, specifier) {
            ResolvedModule::File(target) => {
                self.dependencies
                    .entry(from.to_path_buf())
                    .or_default()
                    .insert(target.clone());
                Some(self.resolve_file(&target))
            }
            ResolvedModule::Package(name) => {
                trace!(file = %from.display(), module = %name, "not following external module");
                self.diagnostics.push(
                    Diagnostic::info(PHASE, format!("external module '{}' not followed", name))
                        .at(from.display().to_string()),
                );
                None
            }
        }
    }

    fn bind_import(&mut self, path: &Path, import: &ImportRecord, scope: &mut FileScope) {
        let Some(target) = self.target_scope(path, &import.specifier) else {
            return;
        };

        match import.kind {
            ImportKind::Namespace => {
                bind_namespace(&target, &import.local_name, scope);
            }
            ImportKind::Default => {
                if let Some(id) = target.get(DEFAULT_EXPORT) {
                    scope.insert(import.local_name.clone(), id.clone());
                }
            }
            ImportKind::Named => {
                bind_named(&target, &import.imported_name, &import.local_name, scope);
            }
        }
    }

    fn bind_export(&mut self, path: &Path, export: &ExportRecord, scope: &mut FileScope) {
        let Some(specifier) = &export.specifier else {
            // export { X as Y } of something already in scope
            let source = scope.clone();
            bind_named(&source, &export.local_name, &export.exported_name, scope);
            return;
        };

        let Some(target) = self.target_scope(path, specifier) else {
            return;
        };

        if export.is_wildcard {
            for (name, id) in &target {
                if name != DEFAULT_EXPORT {
                    scope.entry(name.clone()).or_insert_with(|| id.clone());
                }
            }
        } else if export.is_namespace_export {
            bind_namespace(&target, &export.exported_name, scope);
        } else {
            bind_named(&target, &export.local_name, &export.exported_name, scope);
        }
    }
}

fn has_unresolved(scope: &FileScope, references: &BTreeSet<String>) -> bool {
    references.iter().any(|r| lookup(scope, r).is_none())
}

/// Bindings `index` provides for the references `scope` cannot resolve,
/// keyed by the head of each reference.
fn ambient_bindings(
    index: &FileScope,
    scope: &FileScope,
    references: &BTreeSet<String>,
) -> Vec<(String, DeclId)> {
    references
        .iter()
        .filter(|reference| lookup(scope, reference).is_none())
        .filter_map(|reference| reference.split('.').next())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|head| index.get(head).map(|id| (head.to_string(), id.clone())))
        .collect()
}

/// Add `prefix.member` for every entry of `target`.
fn bind_namespace(target: &FileScope, prefix: &str, scope: &mut FileScope) {
    for (name, id) in target {
        if name != DEFAULT_EXPORT {
            scope.insert(format!("{}.{}", prefix, name), id.clone());
        }
    }
}

/// Bind `local` to `name` in `source`. When `name` is a namespace binding
/// (only `name.member` entries exist) its members are carried over under
/// `local.member`.
fn bind_named(source: &FileScope, name: &str, local: &str, scope: &mut FileScope) {
    if let Some(id) = source.get(name) {
        scope.insert(local.to_string(), id.clone());
        return;
    }

    let prefix = format!("{}.", name);
    let members: Vec<(String, DeclId)> = source
        .range(prefix.clone()..)
        .take_while(|(key, _)| key.starts_with(&prefix))
        .map(|(key, id)| (format!("{}.{}", local, &key[prefix.len()..]), id.clone()))
        .collect();
    scope.extend(members);
}
