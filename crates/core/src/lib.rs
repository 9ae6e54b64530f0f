//! mdfold Core Library
//!
//! Adds Vim fold markers (`<!-- {{{N -->` / `<!-- }}}N -->`) to markdown
//! documents so that every heading section can be folded in the editor.
//!
//! # Features
//!
//! - Two interchangeable heading extractors: a line/regex scanner and a
//!   tree-sitter-md grammar parse
//! - Stack-based fold nesting: a heading closes every open section at the
//!   same or a deeper level
//! - Backtick fenced code blocks are never annotated
//! - Batch annotation of whole directory trees
//! - Reports in JSON, YAML, or plain text
//!
//! Running the annotator over an already annotated file wraps every heading a
//! second time; markers are not recognised on input.
//!
//! # Example
//!
//! ```
//! use mdfold_core::{annotate_text, Annotation, FoldConfig};
//!
//! let result = annotate_text("# Intro\nhello\n", &FoldConfig::default()).unwrap();
//! if let Annotation::Annotated { content, .. } = result {
//!     assert_eq!(content, "# Intro <!-- {{{0 -->\nhello\n\n<!-- }}}0 -->\n");
//! }
//! ```

pub mod config;
pub mod engine;
pub mod extractors;
pub mod models;
pub mod output;

// Re-exports for convenience
pub use config::{ConfigError, FoldConfig};
pub use engine::{
    add_foldmarks, annotate_text, fold_structure, list_headings, read_document, split_lines,
    Annotation, FoldAnnotator, FoldError, FoldOutcome, MarkdownScanner, ScanError,
};
pub use extractors::{create_extractor, ExtractorError, HeadingExtractor};
pub use models::*;
pub use output::{format_headings, format_report, format_summary, FormatError, OutputFormat};
