//! File discovery: explicit paths, include/exclude globs and config defaults.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::{config_base_dir, DiscoveryConfig};
use crate::diagnostic::GuardzError;
use crate::frontend::Frontend;
use crate::frontend::typescript::TypeScriptFrontend;

/// Where the discovered file list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Explicit,
    Glob,
    Config,
    None,
}

/// Discovery inputs.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub files: Vec<PathBuf>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub config_path: Option<PathBuf>,
    /// Directories whose contents include patterns never return, such as a
    /// server's request workspaces. Explicit files are not affected.
    pub skip_dirs: Vec<PathBuf>,
}

/// An ordered, deduplicated file list with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryResult {
    pub files: Vec<PathBuf>,
    pub source: DiscoverySource,
}

/// Resolves discovery options to a concrete file list.
#[derive(Debug, Default, Clone)]
pub struct FileDiscovery {
    frontend: TypeScriptFrontend,
}

impl FileDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn discover(&self, options: &DiscoveryOptions) -> Result<DiscoveryResult, GuardzError> {
        let mut includes = options.includes.clone();
        let mut excludes = options.excludes.clone();
        let mut base_dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            base_dirs.push(cwd);
        }

        if let Some(config_path) = &options.config_path {
            let config = DiscoveryConfig::load(config_path)?;
            let base = config_base_dir(config_path);
            if includes.is_empty() {
                includes = resolve_patterns(&base, config.includes.unwrap_or_default());
            }
            if excludes.is_empty() {
                excludes = resolve_patterns(&base, config.excludes.unwrap_or_default());
            }
            base_dirs.push(base);
        }

        let exclude_set = build_glob_set(&excludes)?;
        let is_excluded = |path: &Path| {
            exclude_set.is_match(path)
                || base_dirs
                    .iter()
                    .filter_map(|base| path.strip_prefix(base).ok())
                    .any(|relative| exclude_set.is_match(relative))
        };

        let skip = SkipDirs::new(&options.skip_dirs);
        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for file in &options.files {
            if !is_excluded(file) && seen.insert(file.clone()) {
                files.push(file.clone());
            }
        }

        for pattern in &includes {
            for path in self.expand_include(pattern, &skip)? {
                if !is_excluded(&path) && seen.insert(path.clone()) {
                    files.push(path);
                }
            }
        }

        let source = if options.config_path.is_some() {
            DiscoverySource::Config
        } else if !options.includes.is_empty() {
            DiscoverySource::Glob
        } else if !options.files.is_empty() {
            DiscoverySource::Explicit
        } else {
            DiscoverySource::None
        };

        debug!(count = files.len(), source = ?source, "discovered files");
        Ok(DiscoveryResult { files, source })
    }

    /// Walks the literal prefix of a pattern and returns matching source files, sorted.
    fn expand_include(&self, pattern: &str, skip: &SkipDirs) -> Result<Vec<PathBuf>, GuardzError> {
        let base = literal_prefix(pattern);
        if base == Path::new(pattern) {
            // No glob characters: a plain path
            let path = PathBuf::from(pattern);
            return Ok(if path.is_file() && self.frontend.handles(&path) && !skip.contains(&path) {
                vec![path]
            } else {
                Vec::new()
            });
        }

        let matcher = compile_glob(pattern)?.compile_matcher();
        let walk_root = if base.as_os_str().is_empty() { PathBuf::from(".") } else { base };
        if skip.contains(&walk_root) {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in WalkDir::new(&walk_root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                let is_dir = e.file_type().is_dir();
                e.depth() == 0 || !(is_skipped_dir(e.path(), is_dir) || (is_dir && skip.contains(e.path())))
            })
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !self.frontend.handles(path) {
                continue;
            }
            let candidate = path.strip_prefix("./").unwrap_or(path);
            if matcher.is_match(path) || matcher.is_match(candidate) {
                matches.push(path.to_path_buf());
            }
        }
        Ok(matches)
    }
}

/// Canonicalized directories excluded from include walks.
struct SkipDirs(Vec<PathBuf>);

impl SkipDirs {
    fn new(dirs: &[PathBuf]) -> Self {
        Self(dirs.iter().map(|dir| canonical(dir)).collect())
    }

    /// True if `path` is one of the directories or lies beneath one.
    fn contains(&self, path: &Path) -> bool {
        if self.0.is_empty() {
            return false;
        }
        let path = canonical(path);
        self.0.iter().any(|dir| path.starts_with(dir))
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn is_skipped_dir(path: &Path, is_dir: bool) -> bool {
    if !is_dir {
        return false;
    }
    match path.file_name().map(|n| n.to_string_lossy()) {
        Some(name) => name == "node_modules" || (name.starts_with('.') && name != "." && name != ".."),
        None => false,
    }
}

fn is_glob_component(component: &str) -> bool {
    component.contains(|c| matches!(c, '*' | '?' | '[' | '{'))
}

/// Leading path components without glob syntax: `src/models/**/*.ts` -> `src/models`.
fn literal_prefix(pattern: &str) -> PathBuf {
    let mut prefix = PathBuf::new();
    if pattern.starts_with('/') {
        prefix.push("/");
    }
    for component in pattern.split('/').filter(|c| !c.is_empty()) {
        if is_glob_component(component) {
            return prefix;
        }
        prefix.push(component);
    }
    prefix
}

fn resolve_patterns(base: &Path, patterns: Vec<String>) -> Vec<String> {
    patterns
        .into_iter()
        .map(|pattern| {
            if Path::new(&pattern).is_absolute() || pattern.starts_with("**") {
                pattern
            } else {
                let trimmed = pattern.strip_prefix("./").unwrap_or(&pattern);
                base.join(trimmed).to_string_lossy().to_string()
            }
        })
        .collect()
}

fn compile_glob(pattern: &str) -> Result<Glob, GuardzError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| GuardzError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, GuardzError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(compile_glob(pattern)?);
    }
    builder.build().map_err(|e| GuardzError::InvalidGlob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/models")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::write(root.join("src/models/user.ts"), "export interface User { id: string }").unwrap();
        std::fs::write(root.join("src/models/user.test.ts"), "").unwrap();
        std::fs::write(root.join("src/models/types.d.ts"), "").unwrap();
        std::fs::write(root.join("src/index.ts"), "").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.ts"), "").unwrap();
        dir
    }

    fn pattern(dir: &TempDir, relative: &str) -> String {
        format!("{}/{}", dir.path().display(), relative)
    }

    #[test]
    fn test_explicit_files() {
        let files = vec![PathBuf::from("/tmp/a.ts"), PathBuf::from("/tmp/b.ts"), PathBuf::from("/tmp/a.ts")];
        let result = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                files: files.clone(),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(result.source, DiscoverySource::Explicit);
        assert_eq!(result.files, files[..2].to_vec());
    }

    #[test]
    fn test_nothing_requested() {
        let result = FileDiscovery::new().discover(&DiscoveryOptions::default()).unwrap();
        assert_eq!(result.source, DiscoverySource::None);
        assert!(result.files.is_empty());
    }

    #[test]
    fn test_glob_include_skips_declarations_and_node_modules() {
        let dir = setup_test_dir();
        let result = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                includes: vec![pattern(&dir, "**/*.ts")],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(result.source, DiscoverySource::Glob);
        assert_eq!(
            result.files,
            vec![
                dir.path().join("src/index.ts"),
                dir.path().join("src/models/user.test.ts"),
                dir.path().join("src/models/user.ts"),
            ]
        );
    }

    #[test]
    fn test_excludes_narrow_results() {
        let dir = setup_test_dir();
        let result = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                includes: vec![pattern(&dir, "src/**/*.ts")],
                excludes: vec!["**/*.test.ts".to_string()],
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            result.files,
            vec![dir.path().join("src/index.ts"), dir.path().join("src/models/user.ts")]
        );
    }

    #[test]
    fn test_config_supplies_patterns() {
        let dir = setup_test_dir();
        let config = dir.path().join("guardz.generator.config.ts");
        std::fs::write(
            &config,
            "export default { includes: ['src/models/*.ts'], excludes: ['**/*.test.ts'] };",
        )
        .unwrap();

        let result = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                config_path: Some(config),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(result.source, DiscoverySource::Config);
        assert_eq!(result.files, vec![dir.path().join("src/models/user.ts")]);
    }

    #[test]
    fn test_skip_dirs_hide_their_contents() {
        let dir = setup_test_dir();
        std::fs::create_dir_all(dir.path().join("temp/req-other")).unwrap();
        std::fs::write(dir.path().join("temp/req-other/temp_1_0.ts"), "export type A = string;").unwrap();
        let skip_dirs = vec![dir.path().join("temp")];

        let walked = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                includes: vec![pattern(&dir, "**/*.ts")],
                skip_dirs: skip_dirs.clone(),
                ..Default::default()
            })
            .unwrap();
        assert!(walked.files.iter().all(|f| !f.starts_with(dir.path().join("temp"))));
        assert!(walked.files.contains(&dir.path().join("src/index.ts")));

        let inside = FileDiscovery::new()
            .discover(&DiscoveryOptions {
                includes: vec![
                    pattern(&dir, "temp/req-other/*.ts"),
                    pattern(&dir, "temp/req-other/temp_1_0.ts"),
                ],
                skip_dirs,
                ..Default::default()
            })
            .unwrap();
        assert!(inside.files.is_empty());
    }

    #[test]
    fn test_invalid_glob() {
        let result = FileDiscovery::new().discover(&DiscoveryOptions {
            includes: vec!["src/[".to_string()],
            ..Default::default()
        });
        assert!(matches!(result, Err(GuardzError::InvalidGlob { .. })));
    }

    #[test]
    fn test_literal_prefix() {
        assert_eq!(literal_prefix("src/models/**/*.ts"), PathBuf::from("src/models"));
        assert_eq!(literal_prefix("/abs/dir/*.ts"), PathBuf::from("/abs/dir"));
        assert_eq!(literal_prefix("**/*.ts"), PathBuf::new());
    }
}
