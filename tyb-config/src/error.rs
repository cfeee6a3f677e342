use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for configuration operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for errors that point into a `tyb.toml`.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    pub fn missing_field_error(
        &self,
        field: impl Into<String>,
        section: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::MissingField {
            src: self.named_source(),
            span,
            field: field.into(),
            section: section.into(),
        })
    }

    pub fn validation_error_at(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tyb.toml")]
    #[diagnostic(code(tyb::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing field '{field}' in [{section}]")]
    #[diagnostic(code(tyb::missing_field))]
    MissingField {
        #[source_code]
        src: NamedSource<String>,
        #[label("add '{field}' to this section")]
        span: Option<SourceSpan>,
        field: String,
        section: String,
    },

    #[error("{message}")]
    #[diagnostic(code(tyb::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("invalid entry '{entry}': {reason}")]
    #[diagnostic(
        code(tyb::invalid_entry),
        help("entries look like 'path/to/file.ts:TypeName' or 'path/to/file.ts:TypeName:Alias'")
    )]
    InvalidEntry { entry: String, reason: String },

    #[error("invalid {context} '{name}'")]
    #[diagnostic(
        code(tyb::invalid_identifier),
        help("{reason}. Use only letters, digits, '_' and '$', not starting with a digit.")
    )]
    InvalidIdentifier {
        name: String,
        context: String,
        reason: String,
    },

    #[error("failed to parse tsconfig '{path}'")]
    #[diagnostic(code(tyb::tsconfig))]
    Tsconfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("tsconfig 'extends' cycle detected at '{path}'")]
    #[diagnostic(code(tyb::extends_cycle))]
    ExtendsCycle { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }

    pub fn invalid_entry(entry: impl Into<String>, reason: impl Into<String>) -> Box<Self> {
        Box::new(Error::InvalidEntry {
            entry: entry.into(),
            reason: reason.into(),
        })
    }

    pub fn invalid_identifier(
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
    ) -> Box<Self> {
        Box::new(Error::InvalidIdentifier {
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }
}
