//! Data model shared across the bundling pipeline.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
    ops::Range,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;

/// Scope key under which a file records its default-exported declaration.
pub const DEFAULT_EXPORT: &str = "default";

/// Globally unique identity of a declaration: the absolute path of the
/// defining file plus the declared name.
///
/// Ordering is lexicographic on the path text, then on the name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclId {
    pub file: PathBuf,
    pub name: String,
}

impl DeclId {
    pub fn new(file: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            name: name.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }
}

impl Ord for DeclId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.file
            .as_os_str()
            .cmp(other.file.as_os_str())
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl PartialOrd for DeclId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.display(), self.name)
    }
}

/// Kind of a bundled declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Interface,
    TypeAlias,
    Enum,
}

impl DeclKind {
    /// The TypeScript keyword introducing this kind of declaration.
    pub fn keyword(&self) -> &'static str {
        match self {
            DeclKind::Interface => "interface",
            DeclKind::TypeAlias => "type",
            DeclKind::Enum => "enum",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A type reference inside a declaration's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpan {
    /// Byte range in [`Declaration::raw`].
    pub range: Range<usize>,
    /// The referenced name without whitespace (`Foo`, `ns.Foo`).
    pub name: String,
}

impl ReferenceSpan {
    pub fn new(range: Range<usize>, name: impl Into<String>) -> Self {
        Self {
            range,
            name: name.into(),
        }
    }
}

/// A locally declared type alias, interface or enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub id: DeclId,
    pub kind: DeclKind,
    /// Source text of the declaration as written in its file.
    pub raw: String,
    /// Byte range of the declared name in `raw`.
    pub name_range: Range<usize>,
    /// Names used by the declaration, as spelled in its file
    /// (`Foo`, or `ns.Foo` for namespace-qualified references).
    pub references: BTreeSet<String>,
    /// Where each reference occurs in `raw`, in source order.
    pub spans: Vec<ReferenceSpan>,
}

impl Declaration {
    /// The name the declaration was declared with.
    pub fn name(&self) -> &str {
        &self.id.name
    }

    /// Path of the defining file.
    pub fn file(&self) -> &Path {
        &self.id.file
    }
}

/// Names visible in one file, mapped to the declaration each one denotes.
///
/// Holds local declarations, imported bindings, `ns.Member` entries for
/// namespace imports, re-exported bindings and the [`DEFAULT_EXPORT`] key.
pub type FileScope = BTreeMap<String, DeclId>;

/// Every visited file's scope, keyed by absolute path.
pub type ResolutionMaps = IndexMap<PathBuf, FileScope>;

/// Final, collision-free output name of every bundled declaration.
pub type FinalNameAssignment = BTreeMap<DeclId, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decl_id_orders_by_path_text_then_name() {
        let a = DeclId::new("/p/a-b.ts", "T");
        let b = DeclId::new("/p/a/b.ts", "T");
        let c = DeclId::new("/p/a/b.ts", "U");

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_decl_id_display() {
        let id = DeclId::new("/src/user.ts", "User");
        assert_eq!(id.to_string(), "/src/user.ts:User");
    }

    #[test]
    fn test_decl_kind_keyword() {
        assert_eq!(DeclKind::Interface.keyword(), "interface");
        assert_eq!(DeclKind::TypeAlias.to_string(), "type");
        assert_eq!(DeclKind::Enum.to_string(), "enum");
    }
}
