mod annotator;
mod driver;
mod scanner;

pub use annotator::{fold_structure, FoldAnnotator};
pub use driver::{
    add_foldmarks, annotate_text, list_headings, read_document, split_lines, Annotation, FoldError,
    FoldOutcome,
};
pub use scanner::{MarkdownScanner, ScanError};
