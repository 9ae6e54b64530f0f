use crate::models::{ExtractorKind, Heading};
use regex::Regex;
use std::sync::LazyLock;

use super::{is_fence_line, ExtractorError, HeadingExtractor};

static ATX_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").expect("valid ATX heading pattern"));

/// Regex-based extractor working one line at a time
///
/// Headings must start at column 0. Lines between backtick fences are
/// skipped; an unterminated fence hides every heading after it.
#[derive(Debug, Default)]
pub struct LineExtractor;

impl LineExtractor {
    pub fn new() -> Self {
        Self
    }

    fn match_heading(line: &str, line_index: usize) -> Option<Heading> {
        if !line.starts_with('#') {
            return None;
        }

        let line = line.trim_end_matches(['\n', '\r']);
        let caps = ATX_HEADING.captures(line)?;
        let text = caps[2].trim();
        if text.is_empty() {
            return None;
        }

        Some(Heading::new(caps[1].len() as u8, line_index, text))
    }
}

impl HeadingExtractor for LineExtractor {
    fn extract(&mut self, lines: &[String]) -> Result<Vec<Heading>, ExtractorError> {
        let mut headings = Vec::new();
        let mut in_code_block = false;

        for (i, line) in lines.iter().enumerate() {
            if is_fence_line(line) {
                in_code_block = !in_code_block;
                continue;
            }

            if in_code_block {
                continue;
            }

            if let Some(heading) = Self::match_heading(line, i) {
                headings.push(heading);
            }
        }

        Ok(headings)
    }

    fn kind(&self) -> ExtractorKind {
        ExtractorKind::Line
    }
}
