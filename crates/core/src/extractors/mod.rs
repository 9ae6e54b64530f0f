mod grammar;
mod line;

pub use grammar::TreeSitterExtractor;
pub use line::LineExtractor;

use crate::models::{ExtractorKind, Heading};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Failed to initialize markdown grammar: {0}")]
    InitError(String),
}

/// Finds ATX headings in a document
///
/// Implementations return headings in ascending line order, at most one per
/// line. Malformed markdown never fails; it just yields fewer headings.
pub trait HeadingExtractor {
    fn extract(&mut self, lines: &[String]) -> Result<Vec<Heading>, ExtractorError>;

    fn kind(&self) -> ExtractorKind;
}

/// Create an extractor for the given strategy
pub fn create_extractor(kind: ExtractorKind) -> Result<Box<dyn HeadingExtractor>, ExtractorError> {
    match kind {
        ExtractorKind::Line => Ok(Box::new(LineExtractor::new())),
        ExtractorKind::TreeSitter => Ok(Box::new(TreeSitterExtractor::new()?)),
    }
}

/// A line opens or closes a backtick code fence
pub(crate) fn is_fence_line(line: &str) -> bool {
    line.trim().starts_with("```")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::split_lines;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("# A\ntext\n## B\ntext\n# C\n")]
    #[case("```\n# not a heading\n```\n# Real\n")]
    #[case("# Title\n\n```rust\n## inside\n```\n\n### Deep\n#### Deeper\n## Back\n")]
    #[case("#NoSpace\n####### TooDeep\nplain text\n")]
    #[case("")]
    fn test_extractors_agree(#[case] source: &str) {
        let lines = split_lines(source);
        let mut by_line = create_extractor(ExtractorKind::Line).unwrap();
        let mut by_grammar = create_extractor(ExtractorKind::TreeSitter).unwrap();

        let expected: Vec<(u8, usize)> = by_line
            .extract(&lines)
            .unwrap()
            .iter()
            .map(|h| (h.level, h.line_index))
            .collect();
        let actual: Vec<(u8, usize)> = by_grammar
            .extract(&lines)
            .unwrap()
            .iter()
            .map(|h| (h.level, h.line_index))
            .collect();

        assert_eq!(expected, actual);
    }

    #[test]
    fn test_info_string_line_closes_fence_only_for_line_scanner() {
        let lines = split_lines("```\n```js\n# A\n```\n");
        let by_line = LineExtractor::new().extract(&lines).unwrap();
        let mut grammar = TreeSitterExtractor::new().unwrap();
        let by_grammar = grammar.extract(&lines).unwrap();

        assert_eq!(by_line, vec![Heading::new(1, 2, "A")]);
        assert!(by_grammar.is_empty());
    }

    #[test]
    fn test_fence_line() {
        assert!(is_fence_line("```"));
        assert!(is_fence_line("   ```python\n"));
        assert!(!is_fence_line("``not a fence"));
        assert!(!is_fence_line("~~~"));
    }
}
