mod json;
mod yaml;

pub use json::to_json;
pub use yaml::to_yaml;

use crate::models::{FileStatus, HeadingList, ScanReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
    Summary,
}

/// Format a scan report
pub fn format_report(report: &ScanReport, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(report),
        OutputFormat::Yaml => to_yaml(report),
        OutputFormat::Summary => Ok(format_summary(report)),
    }
}

/// Format the headings of a single file
pub fn format_headings(list: &HeadingList, format: OutputFormat) -> Result<String, FormatError> {
    match format {
        OutputFormat::Json => to_json(list),
        OutputFormat::Yaml => to_yaml(list),
        OutputFormat::Summary => Ok(format_heading_outline(list)),
    }
}

/// Format a scan report as plain text
pub fn format_summary(report: &ScanReport) -> String {
    let mut output = String::new();
    let stats = &report.stats;

    let mode = if report.metadata.dry_run {
        " (dry run)"
    } else {
        ""
    };
    output.push_str(&format!(
        "Fold Marker Summary{}\n\
         ===================\n\
         Root: {}\n\n",
        mode,
        report.root.display()
    ));

    output.push_str(&format!(
        "Files: {} (annotated: {}, no headings: {}, failed: {})\n\
         Headings: {} | Folds: {} | Lines added: {}\n\n",
        stats.total_files,
        stats.annotated_files,
        stats.skipped_files,
        stats.failed_files,
        stats.total_headings,
        stats.total_folds,
        stats.lines_added,
    ));

    for file in &report.files {
        match file.status {
            FileStatus::Failed => output.push_str(&format!(
                "  {} [{}] {}\n",
                file.path.display(),
                file.status.as_str(),
                file.error.as_deref().unwrap_or("unknown error")
            )),
            _ => output.push_str(&format!(
                "  {} [{}] {} folds\n",
                file.path.display(),
                file.status.as_str(),
                file.fold_count
            )),
        }
    }
    if !report.files.is_empty() {
        output.push('\n');
    }

    output.push_str(&format!(
        "Scan Duration: {}ms\n\
         Timestamp: {}\n\
         Tool Version: {}\n",
        report.metadata.scan_duration_ms,
        report.metadata.timestamp,
        report.metadata.tool_version
    ));

    output
}

fn format_heading_outline(list: &HeadingList) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "File: {}\nExtractor: {}\nLine Count: {}\nHeadings: {}\n\n",
        list.path.display(),
        list.extractor.as_str(),
        list.line_count,
        list.headings.len()
    ));

    for heading in &list.headings {
        let indent = "  ".repeat(heading.fold_level() as usize);
        out.push_str(&format!(
            "{}{} {} (line {}, fold {})\n",
            indent,
            "#".repeat(heading.level as usize),
            heading.text,
            heading.line_index + 1,
            heading.fold_level()
        ));
    }

    out
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fold_structure;
    use crate::models::{ExtractorKind, FileReport, Heading, ScanMetadata, ScanStats};
    use std::path::PathBuf;

    fn sample_report() -> ScanReport {
        let files = vec![
            FileReport {
                path: PathBuf::from("README.md"),
                status: FileStatus::Annotated,
                heading_count: 4,
                fold_count: 4,
                lines_added: 8,
                error: None,
            },
            FileReport::failed(PathBuf::from("locked.md"), "permission denied"),
        ];
        let mut stats = ScanStats::default();
        files.iter().for_each(|f| stats.add_file(f));

        ScanReport {
            root: PathBuf::from("/docs"),
            files,
            stats,
            metadata: ScanMetadata::default(),
        }
    }

    #[test]
    fn test_summary() {
        let summary = format_summary(&sample_report());
        assert!(summary.contains("Root: /docs"));
        assert!(summary.contains("annotated: 1"));
        assert!(summary.contains("README.md [annotated] 4 folds"));
        assert!(summary.contains("locked.md [failed] permission denied"));
    }

    #[test]
    fn test_heading_outline() {
        let headings = vec![Heading::new(1, 0, "Intro"), Heading::new(3, 5, "Detail")];
        let list = HeadingList {
            path: PathBuf::from("doc.md"),
            extractor: ExtractorKind::Line,
            line_count: 9,
            folds: fold_structure(&headings),
            headings,
        };

        let outline = format_headings(&list, OutputFormat::Summary).unwrap();
        assert!(outline.contains("# Intro (line 1, fold 0)"));
        assert!(outline.contains("    ### Detail (line 6, fold 2)"));

        let json = format_headings(&list, OutputFormat::Json).unwrap();
        assert!(json.contains("\"fold_level\": 2"));
        assert!(json.contains("\"extractor\": \"line\""));
    }
}
