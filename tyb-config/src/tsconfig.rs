//! `tsconfig.json` loading: comment-tolerant JSON, `extends` chains and
//! `compilerOptions.paths` aliases.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;
use tracing::debug;

use crate::{Error, Result};

/// Matches, in priority order: a string literal (kept), a line or block
/// comment (dropped), or a comma followed only by whitespace and a closing
/// bracket (dropped, bracket kept).
static JSONC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("(?:[^"\\]|\\.)*")|//[^\n]*|/\*[\s\S]*?\*/|,(\s*[}\]])"#)
        .expect("valid jsonc regex")
});

/// Strip comments and trailing commas so `serde_json` accepts the input.
pub fn sanitize_jsonc(input: &str) -> String {
    JSONC_RE
        .replace_all(input, |caps: &Captures<'_>| {
            if let Some(literal) = caps.get(1) {
                literal.as_str().to_string()
            } else if let Some(close) = caps.get(2) {
                close.as_str().to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Extends {
    One(String),
    Many(Vec<String>),
}

impl Extends {
    fn into_vec(self) -> Vec<String> {
        match self {
            Extends::One(path) => vec![path],
            Extends::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TsConfigFile {
    extends: Option<Extends>,
    #[serde(default)]
    compiler_options: CompilerOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    base_url: Option<String>,
    #[serde(default)]
    paths: IndexMap<String, Vec<String>>,
}

/// A `compilerOptions.paths` entry with its first target made absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapping {
    pub pattern: String,
    prefix: String,
    suffix: String,
    /// Absolute target; may contain a single `*`.
    pub target: String,
}

impl PathMapping {
    pub fn new(pattern: impl Into<String>, target: impl Into<String>) -> Self {
        let pattern = pattern.into().trim().replace('\\', "/");
        let (prefix, suffix) = match pattern.find('*') {
            Some(star) => (pattern[..star].to_string(), pattern[star + 1..].to_string()),
            None => (pattern.clone(), String::new()),
        };
        Self {
            pattern,
            prefix,
            suffix,
            target: target.into().replace('\\', "/"),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.pattern.contains('*')
    }

    /// Return the text captured by `*` when `specifier` matches this pattern.
    /// Patterns without `*` match exactly and capture nothing.
    pub fn match_specifier(&self, specifier: &str) -> Option<String> {
        if !self.is_wildcard() {
            return (self.pattern == specifier).then(String::new);
        }

        let rest = specifier.strip_prefix(&self.prefix)?;
        let captured = rest.strip_suffix(&self.suffix)?;
        Some(captured.to_string())
    }

    pub fn specificity(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    /// Substitute the captured text into the target.
    pub fn substitute(&self, captured: &str) -> PathBuf {
        PathBuf::from(self.target.replace('*', captured))
    }
}

/// The effective settings of a tsconfig after its `extends` chain is applied.
#[derive(Debug, Clone, Default)]
pub struct ResolvedTsconfig {
    pub base_url: Option<PathBuf>,
    pub paths: Vec<PathMapping>,
}

/// Load a tsconfig file, following relative `extends` references.
pub fn load_tsconfig(path: &Path) -> Result<ResolvedTsconfig> {
    let mut visited = HashSet::new();
    let (base_url, paths) = load_inner(path, &mut visited)?;

    let mut paths: Vec<PathMapping> = paths.into_values().collect();
    paths.sort_by(|left, right| {
        right
            .specificity()
            .cmp(&left.specificity())
            .then_with(|| right.pattern.len().cmp(&left.pattern.len()))
            .then_with(|| left.pattern.cmp(&right.pattern))
    });

    Ok(ResolvedTsconfig { base_url, paths })
}

type Layer = (Option<PathBuf>, IndexMap<String, PathMapping>);

fn load_inner(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<Layer> {
    let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical.clone()) {
        return Err(Box::new(Error::ExtendsCycle { path: canonical }));
    }

    let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config: TsConfigFile =
        serde_json::from_str(&sanitize_jsonc(&source)).map_err(|source| {
            Box::new(Error::Tsconfig {
                path: path.to_path_buf(),
                source,
            })
        })?;

    let dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let mut base_url = None;
    let mut paths = IndexMap::new();
    for parent in config.extends.map(Extends::into_vec).unwrap_or_default() {
        match resolve_extends_path(&dir, &parent) {
            Some(parent_path) => {
                let (parent_base, parent_paths) = load_inner(&parent_path, visited)?;
                base_url = parent_base.or(base_url);
                paths.extend(parent_paths);
            }
            None => debug!(extends = %parent, "skipping package tsconfig base"),
        }
    }

    let options = config.compiler_options;
    if let Some(own) = options.base_url {
        base_url = Some(dir.join(own));
    }
    let paths_base = base_url.clone().unwrap_or_else(|| dir.clone());
    for (pattern, targets) in options.paths {
        // Only the first target of each mapping is used.
        let Some(first) = targets.into_iter().next() else {
            continue;
        };
        let target = paths_base.join(first.trim());
        let mapping = PathMapping::new(pattern.clone(), target.to_string_lossy());
        paths.insert(mapping.pattern.clone(), mapping);
    }

    visited.remove(&canonical);
    Ok((base_url, paths))
}

/// Relative and absolute `extends` values resolve to a file; package names
/// are not followed.
fn resolve_extends_path(dir: &Path, extends: &str) -> Option<PathBuf> {
    let mut candidate = PathBuf::from(extends);
    if !(candidate.is_absolute() || extends.starts_with('.')) {
        return None;
    }
    if candidate.extension().is_none() {
        candidate.set_extension("json");
    }
    Some(if candidate.is_absolute() {
        candidate
    } else {
        dir.join(candidate)
    })
}
