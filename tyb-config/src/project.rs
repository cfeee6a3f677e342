use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    Result,
    tsconfig::{PathMapping, load_tsconfig},
};

/// Files or directories whose presence marks a project root.
const ROOT_MARKERS: &[&str] = &["tsconfig.json", "package.json", ".git"];

/// How many directories above the start to search for a root marker.
const MAX_ROOT_DEPTH: usize = 10;

/// Extensions tried for extension-less module specifiers.
pub const DEFAULT_EXTENSIONS: &[&str] = &[".ts", ".tsx", ".d.ts"];

/// Make a path absolute against the current directory, leaving it unchanged
/// when the current directory is unavailable.
pub fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Walk up from `start` looking for a directory holding a root marker.
///
/// Falls back to the directory of `start` when no marker is found.
pub fn find_project_root(start: &Path) -> PathBuf {
    let start = absolute(start);
    let start_dir = if start.is_file() {
        start.parent().map(Path::to_path_buf).unwrap_or(start)
    } else {
        start
    };

    let mut current = Some(start_dir.as_path());
    for _ in 0..MAX_ROOT_DEPTH {
        let Some(dir) = current else { break };
        if ROOT_MARKERS.iter().any(|marker| dir.join(marker).exists()) {
            return dir.to_path_buf();
        }
        current = dir.parent();
    }

    start_dir
}

/// Resolution settings for one project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub root: PathBuf,
    pub base_url: Option<PathBuf>,
    /// Alias mappings, most specific first.
    pub paths: Vec<PathMapping>,
    /// Extension candidates, each with its leading dot.
    pub extensions: Vec<String>,
}

impl ProjectConfig {
    /// A configuration with no aliases and the default extensions.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: absolute(root.as_ref()),
            base_url: None,
            paths: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Load `<root>/tsconfig.json` if present.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::new(root);
        let tsconfig = config.root.join("tsconfig.json");
        if !tsconfig.is_file() {
            debug!(root = %config.root.display(), "no tsconfig.json, using defaults");
            return Ok(config);
        }

        let resolved = load_tsconfig(&tsconfig)?;
        config.base_url = resolved.base_url;
        config.paths = resolved.paths;
        debug!(
            root = %config.root.display(),
            aliases = config.paths.len(),
            "loaded tsconfig"
        );
        Ok(config)
    }

    /// Settle the project for an entry file: the explicit root if given,
    /// otherwise the discovered one. A broken tsconfig is logged and
    /// replaced by defaults.
    pub fn discover(entry: &Path, root: Option<&Path>) -> Self {
        let root = match root {
            Some(root) => absolute(root),
            None => find_project_root(entry),
        };
        match Self::load(&root) {
            Ok(config) => config,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "ignoring unreadable tsconfig");
                Self::new(root)
            }
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_find_project_root_walks_up_to_marker() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("package.json"), "{}").unwrap();
        let nested = root.join("src").join("models");
        fs::create_dir_all(&nested).unwrap();
        let file = nested.join("user.ts");
        fs::write(&file, "export type Id = string;").unwrap();

        assert_eq!(find_project_root(&file), root.to_path_buf());
        assert_eq!(find_project_root(&nested), root.to_path_buf());
    }

    #[test]
    fn test_discover_falls_back_on_broken_tsconfig() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("tsconfig.json"), "{ not json").unwrap();

        let config = ProjectConfig::discover(&root.join("index.ts"), Some(root));
        assert_eq!(config.root, root.to_path_buf());
        assert!(config.paths.is_empty());
        assert_eq!(config.extensions, vec![".ts", ".tsx", ".d.ts"]);
    }

    #[test]
    fn test_load_without_tsconfig_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ProjectConfig::load(temp.path()).unwrap();
        assert!(config.base_url.is_none());
        assert!(config.paths.is_empty());
    }

    #[test]
    fn test_load_reads_aliases() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(
            root.join("tsconfig.json"),
            r#"{ "compilerOptions": { "baseUrl": "./", "paths": { "@/*": ["src/*"] } } }"#,
        )
        .unwrap();

        let config = ProjectConfig::load(root).unwrap();
        assert_eq!(config.paths.len(), 1);
        assert_eq!(config.paths[0].pattern, "@/*");
    }
}
