//! Declaration parsing.
//!
//! The collector only needs typed records for one file: local declarations,
//! import bindings, export statements and the default export. Any parser
//! producing them can be plugged in through [`DeclarationParser`].

mod typescript;

use std::{
    collections::BTreeSet,
    ops::Range,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tybundle_core::{DeclId, DeclKind, Declaration, ReferenceSpan};

pub use typescript::TypeScriptParser;

/// Failure to turn a file into records. Always recoverable: the collector
/// treats the file as empty.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load the TypeScript grammar")]
    Language(#[from] tree_sitter::LanguageError),

    #[error("could not recover any syntax from '{path}'")]
    Syntax { path: PathBuf },
}

/// A type alias, interface or enum declared in the parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeclaration {
    pub name: String,
    pub kind: DeclKind,
    pub raw: String,
    /// Byte range of the name in `raw`.
    pub name_range: Range<usize>,
    pub references: BTreeSet<String>,
    /// Byte ranges of the references in `raw`, in source order.
    pub spans: Vec<ReferenceSpan>,
}

impl ParsedDeclaration {
    /// The registry entry for this declaration in `file`.
    pub fn into_declaration(self, file: &Path) -> Declaration {
        Declaration {
            id: DeclId::new(file, self.name),
            kind: self.kind,
            raw: self.raw,
            name_range: self.name_range,
            references: self.references,
            spans: self.spans,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import Foo from '...'`
    Default,
    /// `import * as ns from '...'`
    Namespace,
    /// `import { A, B as C } from '...'`
    Named,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub local_name: String,
    /// `default` for default imports, `*` for namespace imports.
    pub imported_name: String,
    pub kind: ImportKind,
    pub specifier: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Name visible to importers; the namespace name for `export * as ns`.
    pub exported_name: String,
    /// Name in this file, or in the source module for re-exports.
    pub local_name: String,
    /// Source module for re-exports.
    pub specifier: Option<String>,
    /// `export * from '...'`
    pub is_wildcard: bool,
    /// `export * as ns from '...'`
    pub is_namespace_export: bool,
}

impl ExportRecord {
    pub fn local(exported_name: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            exported_name: exported_name.into(),
            local_name: local_name.into(),
            specifier: None,
            is_wildcard: false,
            is_namespace_export: false,
        }
    }

    pub fn reexport(
        exported_name: impl Into<String>,
        local_name: impl Into<String>,
        specifier: impl Into<String>,
    ) -> Self {
        Self {
            specifier: Some(specifier.into()),
            ..Self::local(exported_name, local_name)
        }
    }

    pub fn wildcard(specifier: impl Into<String>) -> Self {
        Self {
            is_wildcard: true,
            ..Self::reexport("*", "*", specifier)
        }
    }

    pub fn namespace(name: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            is_namespace_export: true,
            ..Self::reexport(name, "*", specifier)
        }
    }
}

/// Everything the collector needs from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    pub declarations: Vec<ParsedDeclaration>,
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
    /// Identifier of `export default <identifier>`.
    pub default_export: Option<String>,
}

impl ParsedFile {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
            && self.imports.is_empty()
            && self.exports.is_empty()
            && self.default_export.is_none()
    }
}

/// Turns a file into declaration, import and export records.
pub trait DeclarationParser: Send + Sync {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError>;
}

impl<P: DeclarationParser + ?Sized> DeclarationParser for Box<P> {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        (**self).parse(path)
    }
}
