use crate::config::FoldConfig;
use crate::extractors::is_fence_line;
use crate::models::{CloseOrder, FoldEntry, Heading, MarkerStyle};
use std::collections::HashMap;

/// Derive one fold per heading: level 1 opens fold 0, level 2 opens fold 1, ...
pub fn fold_structure(headings: &[Heading]) -> Vec<FoldEntry> {
    headings.iter().map(FoldEntry::from).collect()
}

/// Inserts fold markers around heading sections
pub struct FoldAnnotator {
    markers: MarkerStyle,
    close_order: CloseOrder,
}

impl FoldAnnotator {
    pub fn new(markers: MarkerStyle, close_order: CloseOrder) -> Self {
        Self {
            markers,
            close_order,
        }
    }

    pub fn from_config(config: &FoldConfig) -> Self {
        Self::new(config.markers.clone(), config.close_order)
    }

    /// Annotate `lines` (each carrying its own terminator) with fold markers.
    ///
    /// A heading closes every open fold at the same or a deeper level before
    /// opening its own; folds still open at the end are closed after the last
    /// line. Lines inside backtick fences are copied untouched even if a
    /// heading was reported for them. Inserted lines reuse the document's
    /// first line terminator, so CRLF input stays CRLF.
    pub fn annotate(&self, lines: &[String], headings: &[Heading]) -> Vec<String> {
        let eol = line_ending(lines);
        let folds: HashMap<usize, FoldEntry> = fold_structure(headings)
            .into_iter()
            .map(|f| (f.line_index, f))
            .collect();

        let mut result = Vec::with_capacity(lines.len() + headings.len() * 2);
        let mut open_folds: Vec<u8> = Vec::new();
        let mut in_code_block = false;

        for (i, line) in lines.iter().enumerate() {
            if is_fence_line(line) {
                in_code_block = !in_code_block;
                result.push(line.clone());
                continue;
            }

            if in_code_block {
                result.push(line.clone());
                continue;
            }

            let Some(fold) = folds.get(&i) else {
                result.push(line.clone());
                continue;
            };

            while let Some(&top) = open_folds.last() {
                if top < fold.fold_level {
                    break;
                }
                open_folds.pop();
                result.push(self.close_line(top, eol));
                result.push(eol.to_string());
            }

            result.push(format!(
                "{} {}{}",
                line.trim_end(),
                self.markers.open_marker(fold.fold_level),
                eol
            ));
            open_folds.push(fold.fold_level);
        }

        while let Some(closed) = open_folds.pop() {
            match self.close_order {
                CloseOrder::Legacy => {
                    result.push(eol.to_string());
                    result.push(self.close_line(closed, eol));
                }
                CloseOrder::Unified => {
                    result.push(self.close_line(closed, eol));
                    result.push(eol.to_string());
                }
            }
        }

        result
    }

    fn close_line(&self, fold_level: u8, eol: &str) -> String {
        format!("{}{}", self.markers.close_marker(fold_level), eol)
    }
}

/// Terminator of the first terminated line, `\n` if there is none
fn line_ending(lines: &[String]) -> &'static str {
    match lines.iter().find(|l| l.ends_with('\n')) {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

impl Default for FoldAnnotator {
    fn default() -> Self {
        Self::new(MarkerStyle::default(), CloseOrder::default())
    }
}
