use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Heading extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorKind {
    /// Line scanning with a regex, backtick fences tracked by toggling
    #[default]
    Line,
    /// Full markdown grammar parse via tree-sitter-md
    TreeSitter,
}

impl ExtractorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractorKind::Line => "line",
            ExtractorKind::TreeSitter => "tree-sitter",
        }
    }
}

/// Line order used when closing the folds still open at end of document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseOrder {
    /// Blank line, then closing marker (mid-document closes are marker, then blank)
    #[default]
    Legacy,
    /// Closing marker, then blank line everywhere
    Unified,
}

/// Comment delimiters wrapped around fold markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub comment_open: String,
    pub comment_close: String,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            comment_open: "<!--".to_string(),
            comment_close: "-->".to_string(),
        }
    }
}

impl MarkerStyle {
    pub fn new(comment_open: impl Into<String>, comment_close: impl Into<String>) -> Self {
        Self {
            comment_open: comment_open.into(),
            comment_close: comment_close.into(),
        }
    }

    /// `<!-- {{{N -->`
    pub fn open_marker(&self, fold_level: u8) -> String {
        self.wrap(&format!("{}{}", "{".repeat(3), fold_level))
    }

    /// `<!-- }}}N -->`
    pub fn close_marker(&self, fold_level: u8) -> String {
        self.wrap(&format!("{}{}", "}".repeat(3), fold_level))
    }

    fn wrap(&self, marker: &str) -> String {
        let mut out = String::new();
        if !self.comment_open.is_empty() {
            out.push_str(&self.comment_open);
            out.push(' ');
        }
        out.push_str(marker);
        if !self.comment_close.is_empty() {
            out.push(' ');
            out.push_str(&self.comment_close);
        }
        out
    }
}

/// An ATX heading found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Number of leading `#` characters (1-6)
    pub level: u8,
    /// 0-based line index in the document
    pub line_index: usize,
    /// Heading content, trimmed
    pub text: String,
}

impl Heading {
    pub fn new(level: u8, line_index: usize, text: impl Into<String>) -> Self {
        Self {
            level,
            line_index,
            text: text.into(),
        }
    }

    pub fn fold_level(&self) -> u8 {
        self.level.saturating_sub(1)
    }
}

/// Fold opened at a heading line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldEntry {
    pub line_index: usize,
    /// 0-based fold depth, `heading_level - 1`
    pub fold_level: u8,
    pub heading_level: u8,
}

impl From<&Heading> for FoldEntry {
    fn from(heading: &Heading) -> Self {
        Self {
            line_index: heading.line_index,
            fold_level: heading.fold_level(),
            heading_level: heading.level,
        }
    }
}

/// Headings and folds of a single file, as printed by `list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingList {
    pub path: PathBuf,
    pub extractor: ExtractorKind,
    pub line_count: usize,
    pub headings: Vec<Heading>,
    pub folds: Vec<FoldEntry>,
}

/// What happened to a file during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Annotated,
    NoHeadings,
    Failed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Annotated => "annotated",
            FileStatus::NoHeadings => "no_headings",
            FileStatus::Failed => "failed",
        }
    }
}

/// Per-file scan result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    /// Relative path from scan root
    pub path: PathBuf,
    pub status: FileStatus,
    pub heading_count: usize,
    pub fold_count: usize,
    /// Standalone marker and blank lines inserted
    pub lines_added: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn failed(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            path,
            status: FileStatus::Failed,
            heading_count: 0,
            fold_count: 0,
            lines_added: 0,
            error: Some(error.into()),
        }
    }
}

/// Totals across a scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub total_files: usize,
    pub annotated_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    pub total_headings: usize,
    pub total_folds: usize,
    pub lines_added: usize,
}

impl ScanStats {
    pub fn add_file(&mut self, report: &FileReport) {
        self.total_files += 1;
        match report.status {
            FileStatus::Annotated => self.annotated_files += 1,
            FileStatus::NoHeadings => self.skipped_files += 1,
            FileStatus::Failed => self.failed_files += 1,
        }
        self.total_headings += report.heading_count;
        self.total_folds += report.fold_count;
        self.lines_added += report.lines_added;
    }
}

/// Scan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub scan_duration_ms: u64,
    pub dry_run: bool,
    pub timestamp: String,
    pub tool_version: String,
}

impl Default for ScanMetadata {
    fn default() -> Self {
        Self {
            scan_duration_ms: 0,
            dry_run: false,
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Aggregated results of annotating a directory tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub files: Vec<FileReport>,
    pub stats: ScanStats,
    pub metadata: ScanMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_markers() {
        let style = MarkerStyle::default();
        assert_eq!(style.open_marker(0), "<!-- {{{0 -->");
        assert_eq!(style.close_marker(3), "<!-- }}}3 -->");
    }

    #[test]
    fn test_custom_markers() {
        let style = MarkerStyle::new("%", "");
        assert_eq!(style.open_marker(2), "% {{{2");
        assert_eq!(style.close_marker(2), "% }}}2");
    }

    #[test]
    fn test_fold_entry_from_heading() {
        let heading = Heading::new(3, 7, "Usage");
        let entry = FoldEntry::from(&heading);
        assert_eq!(entry.line_index, 7);
        assert_eq!(entry.fold_level, 2);
        assert_eq!(entry.heading_level, 3);
    }

    #[test]
    fn test_stats_add_file() {
        let mut stats = ScanStats::default();
        stats.add_file(&FileReport {
            path: PathBuf::from("a.md"),
            status: FileStatus::Annotated,
            heading_count: 3,
            fold_count: 3,
            lines_added: 6,
            error: None,
        });
        stats.add_file(&FileReport::failed(PathBuf::from("b.md"), "boom"));

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.annotated_files, 1);
        assert_eq!(stats.failed_files, 1);
        assert_eq!(stats.lines_added, 6);
    }
}
