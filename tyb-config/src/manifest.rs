use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::{
    EntryPoint, Error, Result, SourceContext,
    validate::{find_table_span, find_value_span, validate_identifier},
};

/// File name looked up when no manifest path is given.
pub const MANIFEST_FILE: &str = "tyb.toml";

/// Root schema for tyb.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub bundle: BundleSection,

    #[serde(default)]
    pub entries: Vec<EntrySection>,
}

/// `[bundle]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BundleSection {
    pub root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Write one merged bundle to this file instead of one file per entry.
    pub merged: Option<PathBuf>,
}

/// `[[entries]]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySection {
    pub file: PathBuf,
    #[serde(rename = "type")]
    pub type_name: String,
    pub alias: Option<String>,
}

impl FromStr for Manifest {
    type Err = Box<Error>;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_with_filename(s, MANIFEST_FILE)
    }
}

impl Manifest {
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(content, filename);
        let manifest: Self = toml::from_str(content).map_err(|e| ctx.parse_error(e))?;
        manifest.validate(&ctx)?;
        Ok(manifest)
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        if self.bundle.output_dir.is_none() && self.bundle.merged.is_none() {
            return Err(ctx.missing_field_error(
                "output_dir",
                "bundle",
                find_table_span(ctx.src(), "bundle"),
            ));
        }
        Ok(())
    }

    /// Convert `[[entries]]` into entry points, one result per entry.
    /// Relative files resolve against `base`.
    pub fn entry_points(&self, ctx: &SourceContext, base: &Path) -> Vec<Result<EntryPoint>> {
        let mut cursor = 0;
        self.entries
            .iter()
            .map(|section| {
                let entry_start = ctx.src()[cursor..]
                    .find("[[entries]]")
                    .map(|pos| cursor + pos)
                    .unwrap_or(cursor);
                cursor = entry_start + 1;
                section.to_entry_point(ctx, entry_start, base)
            })
            .collect()
    }
}

impl EntrySection {
    fn to_entry_point(&self, ctx: &SourceContext, from: usize, base: &Path) -> Result<EntryPoint> {
        let mut names = vec![("type", &self.type_name)];
        if let Some(alias) = &self.alias {
            names.push(("alias", alias));
        }
        for (field, name) in names {
            if let Some(reason) = validate_identifier(name) {
                return Err(ctx.validation_error_at(
                    format!("invalid {} '{}': {}", field, name, reason),
                    find_value_span(ctx.src(), name, from),
                ));
            }
        }

        let entry = EntryPoint {
            file: self.file.clone(),
            type_name: self.type_name.clone(),
            alias: self.alias.clone(),
        };
        Ok(entry.relative_to(base))
    }
}

/// Represents a tyb.toml file with both raw content and parsed manifest.
#[derive(Debug)]
pub struct BundleToml {
    path: PathBuf,
    ctx: SourceContext,
    manifest: Manifest,
}

impl BundleToml {
    /// Open and parse a tyb.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            ctx: SourceContext::new(content, filename),
            manifest,
        })
    }

    /// Parse manifest text as if it lived at `path`.
    pub fn from_str(content: &str, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let filename = path.display().to_string();
        let manifest = Manifest::from_str_with_filename(content, &filename)?;
        Ok(Self {
            path,
            ctx: SourceContext::new(content, filename),
            manifest,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        self.ctx.src()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Directory the manifest's relative paths are anchored to.
    pub fn dir(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn root(&self) -> Option<PathBuf> {
        self.manifest.bundle.root.as_ref().map(|root| self.dir().join(root))
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        self.manifest
            .bundle
            .output_dir
            .as_ref()
            .map(|dir| self.dir().join(dir))
    }

    pub fn merged(&self) -> Option<PathBuf> {
        self.manifest.bundle.merged.as_ref().map(|file| self.dir().join(file))
    }

    pub fn entry_points(&self) -> Vec<Result<EntryPoint>> {
        self.manifest.entry_points(&self.ctx, &self.dir())
    }
}
