//! Module specifier resolution.

use std::path::{Component, Path, PathBuf};

use tracing::trace;
use tybundle_config::{PathMapping, ProjectConfig};

/// Where a module specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedModule {
    /// A file on disk, absolute and lexically normalised.
    File(PathBuf),
    /// Anything that did not resolve to a file; the specifier is kept verbatim.
    Package(String),
}

impl ResolvedModule {
    pub fn as_file(&self) -> Option<&Path> {
        match self {
            ResolvedModule::File(path) => Some(path),
            ResolvedModule::Package(_) => None,
        }
    }
}

/// Extensions recognised on a specifier that already names a file.
const KNOWN_EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".mts", ".cts", ".tsx", ".ts", ".mjs", ".cjs", ".jsx", ".js",
];

/// Maps module specifiers to files using the project's aliases and
/// extension candidates. Never fails: anything unresolvable is a package.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    root: PathBuf,
    base_url: Option<PathBuf>,
    paths: Vec<PathMapping>,
    extensions: Vec<String>,
}

impl ModuleResolver {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            root: config.root.clone(),
            base_url: config.base_url.clone(),
            paths: config.paths.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, from: &Path, specifier: &str) -> ResolvedModule {
        let spec = specifier.trim().replace('\\', "/");
        let package = || ResolvedModule::Package(specifier.to_string());
        if spec.is_empty() {
            return package();
        }

        let from_dir = from.parent().unwrap_or(Path::new("/"));
        let base = if let Some((mapping, captured)) = self.select_path_mapping(&spec) {
            trace!(specifier, pattern = %mapping.pattern, "matched path alias");
            mapping.substitute(&captured)
        } else if Path::new(&spec).is_absolute() {
            PathBuf::from(&spec)
        } else if spec.starts_with('.') {
            from_dir.join(&spec)
        } else if let Some(base_url) = &self.base_url {
            base_url.join(&spec)
        } else {
            return package();
        };

        self.expand_candidates(&base)
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(ResolvedModule::File)
            .unwrap_or_else(package)
    }

    /// Paths are kept most specific first, so the first match wins.
    fn select_path_mapping(&self, specifier: &str) -> Option<(&PathMapping, String)> {
        self.paths.iter().find_map(|mapping| {
            mapping
                .match_specifier(specifier)
                .map(|captured| (mapping, captured))
        })
    }

    fn expand_candidates(&self, path: &Path) -> Vec<PathBuf> {
        let base = normalize_path(path);
        let base_str = base.to_string_lossy();

        if let Some(ext) = KNOWN_EXTENSIONS.iter().find(|ext| base_str.ends_with(*ext)) {
            let stem = &base_str[..base_str.len() - ext.len()];
            let mut candidates: Vec<PathBuf> = script_substitutes(ext)
                .iter()
                .map(|sub| PathBuf::from(format!("{stem}{sub}")))
                .collect();
            candidates.push(base.clone());
            return candidates;
        }

        let with_ext = self
            .extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{base_str}{ext}")));
        let index = base.join("index");
        let index_str = index.to_string_lossy();
        let with_index = self
            .extensions
            .iter()
            .map(|ext| PathBuf::from(format!("{index_str}{ext}")));
        with_ext.chain(with_index).collect()
    }
}

/// TypeScript sources that a script-extension specifier may stand for.
fn script_substitutes(ext: &str) -> &'static [&'static str] {
    match ext {
        ".js" => &[".ts", ".tsx", ".d.ts"],
        ".jsx" => &[".tsx", ".d.ts"],
        ".mjs" => &[".mts", ".d.mts"],
        ".cjs" => &[".cts", ".d.cts"],
        _ => &[],
    }
}

/// Remove `.` and `..` components without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::RootDir | Component::Normal(_) | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;
    use tybundle_config::PathMapping;

    use super::*;

    fn project(files: &[&str]) -> TempDir {
        let temp = TempDir::new().unwrap();
        for file in files {
            let path = temp.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        temp
    }

    #[test]
    fn test_relative_without_extension_finds_ts_file() {
        let temp = project(&["src/index.ts", "src/user.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));
        let from = temp.path().join("src/index.ts");

        assert_eq!(
            resolver.resolve(&from, "./user"),
            ResolvedModule::File(normalize_path(&temp.path().join("src/user.ts")))
        );
    }

    #[test]
    fn test_parent_dir_is_normalised() {
        let temp = project(&["src/models/user.ts", "src/types.d.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));
        let from = temp.path().join("src/models/user.ts");

        let resolved = resolver.resolve(&from, "../types");
        assert_eq!(
            resolved.as_file(),
            Some(normalize_path(&temp.path().join("src/types.d.ts")).as_path())
        );
    }

    #[test]
    fn test_directory_index() {
        let temp = project(&["src/a.ts", "src/models/index.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));

        let resolved = resolver.resolve(&temp.path().join("src/a.ts"), "./models");
        assert_eq!(
            resolved,
            ResolvedModule::File(normalize_path(&temp.path().join("src/models/index.ts")))
        );
    }

    #[test]
    fn test_extension_order_prefers_ts() {
        let temp = project(&["a.ts", "b.ts", "b.d.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));

        let resolved = resolver.resolve(&temp.path().join("a.ts"), "./b");
        assert!(resolved.as_file().unwrap().ends_with("b.ts"));
    }

    #[test]
    fn test_js_specifier_maps_to_ts_source() {
        let temp = project(&["a.ts", "b.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));

        let resolved = resolver.resolve(&temp.path().join("a.ts"), "./b.js");
        assert!(resolved.as_file().unwrap().ends_with("b.ts"));
    }

    #[test]
    fn test_alias_longest_match() {
        let temp = project(&["src/a.ts", "src/shared/user.ts", "lib/user.ts"]);
        let root = temp.path();
        let mut config = ProjectConfig::new(root);
        config.paths = vec![
            PathMapping::new("@/shared/*", root.join("src/shared/*").to_string_lossy()),
            PathMapping::new("@/*", root.join("lib/*").to_string_lossy()),
        ];
        let resolver = ModuleResolver::new(&config);
        let from = root.join("src/a.ts");

        assert!(
            resolver
                .resolve(&from, "@/shared/user")
                .as_file()
                .unwrap()
                .ends_with("src/shared/user.ts")
        );
        assert!(
            resolver
                .resolve(&from, "@/user")
                .as_file()
                .unwrap()
                .ends_with("lib/user.ts")
        );
    }

    #[test]
    fn test_bare_specifier_is_package() {
        let temp = project(&["a.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));

        assert_eq!(
            resolver.resolve(&temp.path().join("a.ts"), "react"),
            ResolvedModule::Package("react".into())
        );
    }

    #[test]
    fn test_missing_relative_file_is_package() {
        let temp = project(&["a.ts"]);
        let resolver = ModuleResolver::new(&ProjectConfig::new(temp.path()));

        assert_eq!(
            resolver.resolve(&temp.path().join("a.ts"), "./nope"),
            ResolvedModule::Package("./nope".into())
        );
    }

    #[test]
    fn test_bare_specifier_under_base_url() {
        let temp = project(&["src/a.ts", "src/lib/util.ts"]);
        let mut config = ProjectConfig::new(temp.path());
        config.base_url = Some(temp.path().join("src"));
        let resolver = ModuleResolver::new(&config);

        let resolved = resolver.resolve(&temp.path().join("src/a.ts"), "lib/util");
        assert!(resolved.as_file().unwrap().ends_with("src/lib/util.ts"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/./b/../c/d.ts")),
            PathBuf::from("/a/c/d.ts")
        );
    }
}
