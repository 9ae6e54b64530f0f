use crate::config::{ConfigError, FoldConfig, IgnoreFilter};
use crate::engine::driver::{annotate_text, Annotation};
use crate::models::{FileReport, FileStatus, ScanMetadata, ScanReport, ScanStats};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Scan root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Adds fold markers to every markdown file under a directory
pub struct MarkdownScanner {
    root: PathBuf,
    config: FoldConfig,
    ignore_filter: IgnoreFilter,
}

impl MarkdownScanner {
    pub fn new(root: PathBuf, config: FoldConfig) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root));
        }
        let ignore_filter = IgnoreFilter::new(&root, &config)?;
        Ok(Self {
            root,
            config,
            ignore_filter,
        })
    }

    /// Annotate each file in place. With `dry_run` nothing is written.
    ///
    /// Files are processed in parallel, one worker per file, so no path is
    /// ever written twice concurrently. A failing file is recorded in the
    /// report and does not stop the scan.
    pub fn scan(&self, dry_run: bool) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let paths = self.find_markdown_files();
        log::debug!(
            "found {} markdown files under {}",
            paths.len(),
            self.root.display()
        );

        let files: Vec<FileReport> = if self.config.threads == 1 {
            paths
                .iter()
                .map(|path| self.process_file(path, dry_run))
                .collect()
        } else {
            let pool = if self.config.threads > 0 {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.config.threads)
                    .build()
                    .ok()
            } else {
                None
            };

            let run = || {
                paths
                    .par_iter()
                    .map(|path| self.process_file(path, dry_run))
                    .collect::<Vec<_>>()
            };
            match pool {
                Some(pool) => pool.install(run),
                None => run(),
            }
        };

        let mut stats = ScanStats::default();
        for file in &files {
            stats.add_file(file);
        }

        Ok(ScanReport {
            root: self.root.clone(),
            files,
            stats,
            metadata: ScanMetadata {
                scan_duration_ms: start.elapsed().as_millis() as u64,
                dry_run,
                ..Default::default()
            },
        })
    }

    fn find_markdown_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !self.ignore_filter.should_ignore(e.path(), e.file_type().is_dir())
            })
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.config.is_markdown(e.path()))
            .map(|e| e.into_path())
            .collect();

        files.sort();
        files
    }

    fn process_file(&self, path: &Path, dry_run: bool) -> FileReport {
        let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();

        let text = match fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                return FileReport::failed(relative, e.to_string());
            }
        };

        let annotation = match annotate_text(&text, &self.config) {
            Ok(a) => a,
            Err(e) => return FileReport::failed(relative, e.to_string()),
        };

        match annotation {
            Annotation::NoHeadings => FileReport {
                path: relative,
                status: FileStatus::NoHeadings,
                heading_count: 0,
                fold_count: 0,
                lines_added: 0,
                error: None,
            },
            Annotation::Annotated {
                content,
                heading_count,
                fold_count,
                lines_added,
            } => {
                if !dry_run {
                    if let Err(e) = fs::write(path, content) {
                        log::warn!("failed to write {}: {}", path.display(), e);
                        return FileReport::failed(relative, e.to_string());
                    }
                }
                FileReport {
                    path: relative,
                    status: FileStatus::Annotated,
                    heading_count,
                    fold_count,
                    lines_added,
                    error: None,
                }
            }
        }
    }
}
