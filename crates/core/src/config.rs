//! Configuration for annotation and directory scans
//!
//! `FoldConfig` is built with `with_*` methods or loaded from a TOML file.
//! `IgnoreFilter` decides which files a directory scan skips.

use crate::models::{CloseOrder, ExtractorKind, MarkerStyle};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] globset::Error),
}

/// Settings shared by single-file annotation and directory scans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoldConfig {
    /// Heading extraction strategy
    pub extractor: ExtractorKind,

    /// Comment delimiters around markers
    pub markers: MarkerStyle,

    /// End-of-document close order
    pub close_order: CloseOrder,

    /// File extensions treated as markdown during scans
    pub extensions: Vec<String>,

    /// Extra ignore patterns (glob style)
    pub ignore_patterns: Vec<String>,

    /// Whether to include hidden files and directories
    pub include_hidden: bool,

    /// Parallel threads (0 = auto, 1 = sequential)
    pub threads: usize,
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self {
            extractor: ExtractorKind::default(),
            markers: MarkerStyle::default(),
            close_order: CloseOrder::default(),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            ignore_patterns: Vec::new(),
            include_hidden: false,
            threads: 0,
        }
    }
}

impl FoldConfig {
    /// Load a config file. Fields missing from the file keep their defaults.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::ReadError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn with_extractor(mut self, extractor: ExtractorKind) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_markers(mut self, markers: MarkerStyle) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_close_order(mut self, close_order: CloseOrder) -> Self {
        self.close_order = close_order;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Whether a path has one of the configured markdown extensions
    pub fn is_markdown(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext))
    }
}

const DEFAULT_IGNORES: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/target/**",
    "**/vendor/**",
    "**/dist/**",
    "**/build/**",
    "**/.venv/**",
];

/// Filter for skipping files and directories during a scan
pub struct IgnoreFilter {
    root: PathBuf,
    gitignore: Option<Gitignore>,
    custom_globs: GlobSet,
    default_ignores: GlobSet,
    include_hidden: bool,
}

impl IgnoreFilter {
    pub fn new(root: &Path, config: &FoldConfig) -> Result<Self, ConfigError> {
        let defaults: Vec<String> = DEFAULT_IGNORES.iter().map(|s| s.to_string()).collect();

        Ok(Self {
            root: root.to_path_buf(),
            gitignore: Self::build_gitignore(root),
            custom_globs: Self::build_globset(&config.ignore_patterns)?,
            default_ignores: Self::build_globset(&defaults)?,
            include_hidden: config.include_hidden,
        })
    }

    fn build_gitignore(root: &Path) -> Option<Gitignore> {
        let gitignore_path = root.join(".gitignore");
        if !gitignore_path.exists() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(root);
        builder.add(&gitignore_path);
        match builder.build() {
            Ok(gi) => Some(gi),
            Err(e) => {
                log::warn!("Ignoring unreadable {}: {}", gitignore_path.display(), e);
                None
            }
        }
    }

    fn build_globset(patterns: &[String]) -> Result<GlobSet, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            builder.add(Glob::new(pattern)?);
        }
        Ok(builder.build()?)
    }

    /// Check if a path should be skipped. Globs match against the path
    /// relative to the scan root.
    pub fn should_ignore(&self, path: &Path, is_dir: bool) -> bool {
        if !self.include_hidden {
            if let Some(name) = path.file_name() {
                let name = name.to_string_lossy();
                if name.starts_with('.') && name != "." && name != ".." {
                    return true;
                }
            }
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative.to_string_lossy();
        if self.default_ignores.is_match(&*path_str) || self.custom_globs.is_match(&*path_str) {
            return true;
        }

        if let Some(ref gi) = self.gitignore {
            if gi.matched(path, is_dir).is_ignore() {
                return true;
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let config = FoldConfig::default()
            .with_extractor(ExtractorKind::TreeSitter)
            .with_close_order(CloseOrder::Unified)
            .with_threads(2);

        assert_eq!(config.extractor, ExtractorKind::TreeSitter);
        assert_eq!(config.close_order, CloseOrder::Unified);
        assert_eq!(config.threads, 2);
        assert_eq!(config.markers, MarkerStyle::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mdfold.toml");
        std::fs::write(
            &path,
            "extractor = \"tree-sitter\"\n\n[markers]\ncomment_open = \"%\"\n",
        )
        .unwrap();

        let config = FoldConfig::load_from_path(&path).unwrap();
        assert_eq!(config.extractor, ExtractorKind::TreeSitter);
        assert_eq!(config.markers.comment_open, "%");
        assert_eq!(config.markers.comment_close, "-->");
        assert_eq!(config.close_order, CloseOrder::Legacy);
        assert_eq!(config.extensions, vec!["md", "markdown"]);
    }

    #[test]
    fn test_load_rejects_unknown_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mdfold.toml");
        std::fs::write(&path, "extracter = \"line\"\n").unwrap();

        let err = FoldConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = FoldConfig::load_from_path("/nonexistent/mdfold.toml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_is_markdown() {
        let config = FoldConfig::default();
        assert!(config.is_markdown(Path::new("README.md")));
        assert!(config.is_markdown(Path::new("notes/Guide.MARKDOWN")));
        assert!(!config.is_markdown(Path::new("main.rs")));
        assert!(!config.is_markdown(Path::new("Makefile")));
    }

    #[test]
    fn test_ignore_filter() {
        let dir = TempDir::new().unwrap();
        let config = FoldConfig::default().with_ignore_patterns(vec!["**/drafts/**".to_string()]);
        let filter = IgnoreFilter::new(dir.path(), &config).unwrap();

        assert!(filter.should_ignore(Path::new("docs/.hidden.md"), false));
        assert!(filter.should_ignore(Path::new("a/node_modules/pkg/README.md"), false));
        assert!(filter.should_ignore(Path::new("docs/drafts/wip.md"), false));
        assert!(!filter.should_ignore(Path::new("docs/guide.md"), false));
    }

    #[test]
    fn test_globs_match_relative_to_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("build").join("docs");
        let filter = IgnoreFilter::new(&root, &FoldConfig::default()).unwrap();

        assert!(!filter.should_ignore(&root.join("guide.md"), false));
        assert!(filter.should_ignore(&root.join("target/out.md"), false));
    }
}
