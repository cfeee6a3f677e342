//! Batch mode: many entries, one bundler.
//!
//! Malformed entries are collected as configuration errors and the rest of
//! the batch still runs. Entries whose type cannot be found produce no
//! file.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use eyre::{Result, WrapErr};
use tracing::{debug, warn};
use tybundle_config::{ConfigError, EntryPoint};
use tybundle_core::{File, WriteResult};

use crate::{bundler::Bundler, pipeline::Diagnostic};

/// A file written by a batch run.
#[derive(Debug)]
pub struct BatchFile {
    /// Entries bundled into this file.
    pub entries: Vec<EntryPoint>,
    pub path: PathBuf,
    pub result: WriteResult,
    pub declarations: usize,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<BatchFile>,
    pub not_found: Vec<EntryPoint>,
    pub errors: Vec<ConfigError>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BatchReport {
    /// Every requested entry was rejected before bundling.
    pub fn all_failed(&self) -> bool {
        !self.errors.is_empty() && self.written.is_empty() && self.not_found.is_empty()
    }

    fn split(entries: Vec<tybundle_config::Result<EntryPoint>>) -> (Self, Vec<EntryPoint>) {
        let mut report = Self::default();
        let mut valid = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => valid.push(entry),
                Err(e) => {
                    warn!(error = %e, "skipping invalid entry");
                    report.errors.push(*e);
                }
            }
        }
        (report, valid)
    }
}

/// Bundle each entry on its own and write it to
/// `{out_dir}/{sanitized alias or type}.d.ts`.
///
/// Each file gets its own name assignment. Files shared between entries are
/// still parsed once.
pub fn bundle_to_files(
    bundler: &mut Bundler,
    entries: Vec<tybundle_config::Result<EntryPoint>>,
    out_dir: &Path,
) -> Result<BatchReport> {
    let (mut report, entries) = BatchReport::split(entries);
    let mut file_names = HashSet::new();

    for entry in entries {
        let output = bundler
            .bundle_entries(std::slice::from_ref(&entry))
            .wrap_err_with(|| format!("failed to bundle {}", entry))?;
        report.diagnostics.extend(output.diagnostics.iter().cloned());

        if output.is_empty() {
            debug!(entry = %entry, "type not found, no file written");
            report.not_found.push(entry);
            continue;
        }

        let file_name = entry.output_file_name();
        if !file_names.insert(file_name.clone()) {
            warn!(file = %file_name, entry = %entry, "output file name reused, overwriting");
        }
        let path = out_dir.join(&file_name);
        let result = File::new(&path, format!("{}\n", output.text)).write()?;

        report.written.push(BatchFile {
            entries: vec![entry],
            path,
            result,
            declarations: output.declaration_count(),
        });
    }

    Ok(report)
}

/// Bundle every entry into one file at `path` with a single name
/// assignment. Nothing is written when no entry was found.
pub fn bundle_to_file(
    bundler: &mut Bundler,
    entries: Vec<tybundle_config::Result<EntryPoint>>,
    path: &Path,
) -> Result<BatchReport> {
    let (mut report, entries) = BatchReport::split(entries);
    if entries.is_empty() {
        return Ok(report);
    }

    let output = bundler
        .bundle_entries(&entries)
        .wrap_err("failed to bundle merged output")?;
    report.diagnostics = output.diagnostics.clone();
    report.not_found = output.missing.clone();

    if output.is_empty() {
        return Ok(report);
    }

    let result = File::new(path, format!("{}\n", output.text)).write()?;
    let found = entries
        .into_iter()
        .filter(|entry| !output.missing.contains(entry))
        .collect();
    report.written.push(BatchFile {
        entries: found,
        path: path.to_path_buf(),
        result,
        declarations: output.declaration_count(),
    });

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tybundle_config::{ProjectConfig, parse_entries};

    use super::*;
    use crate::{
        parser::TypeScriptParser,
        testing::{CountingParser, Fixture},
    };

    fn fixture() -> Fixture {
        Fixture::new()
            .file(
                "models.ts",
                "import { Id } from './id';\n\
                 export interface User { id: Id }\n\
                 export interface Post { id: Id; author: User }",
            )
            .file("id.ts", "export type Id = string;")
    }

    #[test]
    fn test_each_entry_gets_a_file() {
        let fixture = fixture();
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));
        let models = fixture.path("models.ts");
        let entries = vec![
            Ok(EntryPoint::new(&models, "User").with_alias("UserDTO")),
            Ok(EntryPoint::new(&models, "Post")),
            Ok(EntryPoint::new(&models, "Missing")),
        ];
        let out = fixture.path("out/types");

        let report = bundle_to_files(&mut bundler, entries, &out).unwrap();

        assert_eq!(report.written.len(), 2);
        assert_eq!(report.not_found.len(), 1);
        assert_eq!(
            fs::read_to_string(out.join("UserDTO.d.ts")).unwrap(),
            "export type Id = string;\n\nexport interface UserDTO { id: Id }\n"
        );
        assert_eq!(report.written[1].declarations, 3);
        assert!(out.join("Post.d.ts").is_file());
        assert!(!out.join("Missing.d.ts").exists());
    }

    #[test]
    fn test_shared_file_is_parsed_once() {
        let fixture = fixture();
        let (parser, counter) = CountingParser::new(TypeScriptParser::new());
        let mut bundler = Bundler::new(&ProjectConfig::new(fixture.root()), parser);
        let models = fixture.path("models.ts");
        let entries = vec![
            Ok(EntryPoint::new(&models, "User")),
            Ok(EntryPoint::new(&models, "Post")),
        ];

        bundle_to_files(&mut bundler, entries, &fixture.path("out")).unwrap();

        assert_eq!(counter.count(&models), 1);
        assert_eq!(counter.count(&fixture.path("id.ts")), 1);
    }

    #[test]
    fn test_invalid_entries_do_not_stop_the_batch() {
        let fixture = fixture();
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));
        let models = fixture.path("models.ts");
        let entries = parse_entries([
            format!("{}:User", models.display()),
            "broken".to_string(),
            format!("{}:", models.display()),
        ]);

        let report = bundle_to_files(&mut bundler, entries, &fixture.path("out")).unwrap();

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.written.len(), 1);
        assert!(!report.all_failed());
    }

    #[test]
    fn test_all_invalid_entries_fail() {
        let fixture = fixture();
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));

        let report =
            bundle_to_files(&mut bundler, parse_entries(["nope"]), &fixture.path("out")).unwrap();

        assert!(report.all_failed());
    }

    #[test]
    fn test_file_contents_do_not_depend_on_other_entries() {
        let fixture = Fixture::new()
            .file("a.ts", "export type Id = string;\nexport interface User { id: Id }")
            .file(
                "b.ts",
                "import { Id as Key } from './a';\nexport interface Post { key: Key }",
            );
        let user = EntryPoint::new(fixture.path("a.ts"), "User");
        let post = EntryPoint::new(fixture.path("b.ts"), "Post");
        let run = |entries: Vec<EntryPoint>, out: &str| {
            let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));
            let out = fixture.path(out);
            bundle_to_files(&mut bundler, entries.into_iter().map(Ok).collect(), &out).unwrap();
            out
        };

        let alone = run(vec![user.clone()], "alone");
        let after_post = run(vec![post, user], "after_post");

        let expected = "export type Id = string;\n\nexport interface User { id: Id }\n";
        assert_eq!(fs::read_to_string(alone.join("User.d.ts")).unwrap(), expected);
        assert_eq!(fs::read_to_string(after_post.join("User.d.ts")).unwrap(), expected);
        assert_eq!(
            fs::read_to_string(after_post.join("Post.d.ts")).unwrap(),
            "export type Key = string;\n\nexport interface Post { key: Key }\n"
        );
    }

    #[test]
    fn test_merged_output() {
        let fixture = fixture();
        let mut bundler = Bundler::with_typescript(&ProjectConfig::new(fixture.root()));
        let models = fixture.path("models.ts");
        let entries = vec![
            Ok(EntryPoint::new(&models, "User")),
            Ok(EntryPoint::new(&models, "Missing")),
        ];
        let target = fixture.path("dist/all.d.ts");

        let report = bundle_to_file(&mut bundler, entries, &target).unwrap();

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.written[0].entries.len(), 1);
        assert_eq!(report.not_found.len(), 1);
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "export type Id = string;\n\nexport interface User { id: Id }\n"
        );
    }
}
