//! Test utilities for the bundling engine.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use tempfile::TempDir;

use crate::parser::{DeclarationParser, ParseError, ParsedFile};

/// A throwaway project directory populated with source files.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create fixture directory"),
        }
    }

    /// Write a file relative to the fixture root.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture subdirectory");
        }
        fs::write(&path, content).expect("failed to write fixture file");
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a parser and counts how often each file is parsed.
#[derive(Clone)]
pub struct CountingParser<P> {
    inner: P,
    total: Arc<AtomicUsize>,
    per_file: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

/// Shared view of a [`CountingParser`]'s counters, usable after the parser
/// has been moved into a collector.
#[derive(Clone)]
pub struct ParseCounter {
    total: Arc<AtomicUsize>,
    per_file: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl<P> CountingParser<P> {
    pub fn new(inner: P) -> (Self, ParseCounter) {
        let total = Arc::new(AtomicUsize::new(0));
        let per_file = Arc::new(Mutex::new(HashMap::new()));
        (
            Self {
                inner,
                total: total.clone(),
                per_file: per_file.clone(),
            },
            ParseCounter { total, per_file },
        )
    }
}

impl ParseCounter {
    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    pub fn count(&self, path: &Path) -> usize {
        self.per_file
            .lock()
            .map(|counts| counts.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl<P: DeclarationParser> DeclarationParser for CountingParser<P> {
    fn parse(&self, path: &Path) -> Result<ParsedFile, ParseError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut counts) = self.per_file.lock() {
            *counts.entry(path.to_path_buf()).or_insert(0) += 1;
        }
        self.inner.parse(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TypeScriptParser;

    #[test]
    fn test_counting_parser_counts_per_file() {
        let fixture = Fixture::new()
            .file("a.ts", "type A = 1;")
            .file("b.ts", "type B = 2;");
        let (parser, counter) = CountingParser::new(TypeScriptParser::new());

        parser.parse(&fixture.path("a.ts")).unwrap();
        parser.parse(&fixture.path("a.ts")).unwrap();
        parser.parse(&fixture.path("b.ts")).unwrap();

        assert_eq!(counter.total(), 3);
        assert_eq!(counter.count(&fixture.path("a.ts")), 2);
        assert_eq!(counter.count(&fixture.path("b.ts")), 1);
        assert_eq!(counter.count(&fixture.path("c.ts")), 0);
    }
}
