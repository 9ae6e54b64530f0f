use crate::models::{ExtractorKind, Heading};
use tree_sitter::{Node, Parser};

use super::{ExtractorError, HeadingExtractor};

/// Child node of an `atx_heading` in the tree-sitter-md block grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeadingChild {
    H1Marker,
    H2Marker,
    H3Marker,
    H4Marker,
    H5Marker,
    H6Marker,
    Inline,
    Other,
}

const CHILD_KINDS: [(&str, HeadingChild); 7] = [
    ("atx_h1_marker", HeadingChild::H1Marker),
    ("atx_h2_marker", HeadingChild::H2Marker),
    ("atx_h3_marker", HeadingChild::H3Marker),
    ("atx_h4_marker", HeadingChild::H4Marker),
    ("atx_h5_marker", HeadingChild::H5Marker),
    ("atx_h6_marker", HeadingChild::H6Marker),
    ("inline", HeadingChild::Inline),
];

impl HeadingChild {
    fn from_kind(kind: &str) -> Self {
        CHILD_KINDS
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, child)| *child)
            .unwrap_or(HeadingChild::Other)
    }

    fn level(self) -> Option<u8> {
        match self {
            HeadingChild::H1Marker => Some(1),
            HeadingChild::H2Marker => Some(2),
            HeadingChild::H3Marker => Some(3),
            HeadingChild::H4Marker => Some(4),
            HeadingChild::H5Marker => Some(5),
            HeadingChild::H6Marker => Some(6),
            HeadingChild::Inline | HeadingChild::Other => None,
        }
    }
}

/// Grammar-based extractor using tree-sitter-md
///
/// Reads `atx_heading` nodes straight from the parse tree, so it also sees
/// headings the line scanner cannot: inside block quotes, list items, or
/// indented by up to three spaces.
pub struct TreeSitterExtractor {
    parser: Parser,
}

impl TreeSitterExtractor {
    pub fn new() -> Result<Self, ExtractorError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_md::LANGUAGE.into())
            .map_err(|e| ExtractorError::InitError(e.to_string()))?;

        Ok(Self { parser })
    }

    fn traverse_node(&self, node: &Node, source: &str, headings: &mut Vec<Heading>) {
        if node.kind() == "atx_heading" {
            if let Some(heading) = self.read_heading(node, source) {
                headings.push(heading);
            }
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.traverse_node(&child, source, headings);
        }
    }

    fn read_heading(&self, node: &Node, source: &str) -> Option<Heading> {
        let mut level = None;
        let mut content = None;

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match HeadingChild::from_kind(child.kind()) {
                HeadingChild::Inline => content = Some(child),
                marker => {
                    if let Some(l) = marker.level() {
                        level = Some(l);
                    }
                }
            }
        }

        let level = level?;
        let content = content?;
        let text = source.get(content.byte_range())?.trim();
        if text.is_empty() {
            return None;
        }

        Some(Heading::new(level, node.start_position().row, text))
    }
}

impl HeadingExtractor for TreeSitterExtractor {
    fn extract(&mut self, lines: &[String]) -> Result<Vec<Heading>, ExtractorError> {
        let source = lines.concat();

        let Some(tree) = self.parser.parse(&source, None) else {
            log::warn!("tree-sitter returned no parse tree, treating document as heading-free");
            return Ok(Vec::new());
        };

        let mut headings = Vec::new();
        self.traverse_node(&tree.root_node(), &source, &mut headings);

        headings.sort_by_key(|h| h.line_index);
        headings.dedup_by_key(|h| h.line_index);
        Ok(headings)
    }

    fn kind(&self) -> ExtractorKind {
        ExtractorKind::TreeSitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::split_lines;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Vec<Heading> {
        let mut extractor = TreeSitterExtractor::new().unwrap();
        extractor.extract(&split_lines(source)).unwrap()
    }

    #[test]
    fn test_child_lookup() {
        for (kind, expected) in [
            ("atx_h4_marker", HeadingChild::H4Marker),
            ("inline", HeadingChild::Inline),
            ("setext_heading", HeadingChild::Other),
        ] {
            assert_eq!(HeadingChild::from_kind(kind), expected);
        }
        assert_eq!(HeadingChild::H4Marker.level(), Some(4));
        assert_eq!(HeadingChild::Other.level(), None);
    }

    #[test]
    fn test_basic_headings() {
        let headings = extract("# A\ntext\n## B\ntext\n# C\n");
        let found: Vec<(u8, usize, &str)> = headings
            .iter()
            .map(|h| (h.level, h.line_index, h.text.as_str()))
            .collect();
        assert_eq!(found, vec![(1, 0, "A"), (2, 2, "B"), (1, 4, "C")]);
    }

    #[test]
    fn test_skips_fenced_code() {
        let headings = extract("```\n# not a heading\n```\n# Real\n");
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].line_index, 3);
    }

    #[test]
    fn test_sees_block_quote_heading() {
        let headings = extract("# Top\n\n> ## Quoted\n");
        let lines: Vec<usize> = headings.iter().map(|h| h.line_index).collect();
        assert_eq!(lines, vec![0, 2]);
    }

    #[test]
    fn test_empty_heading_ignored() {
        assert!(extract("#\n").is_empty());
    }
}
