use crate::config::FoldConfig;
use crate::engine::annotator::{fold_structure, FoldAnnotator};
use crate::extractors::{create_extractor, ExtractorError};
use crate::models::HeadingList;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoldError {
    #[error("File '{}' not found.", .0.display())]
    InputNotFound(PathBuf),
    #[error("Error reading file '{}': {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Error writing file '{}': {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Extractor(#[from] ExtractorError),
}

/// Result of annotating a document in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// No headings: the document should be left as it is
    NoHeadings,
    Annotated {
        content: String,
        heading_count: usize,
        fold_count: usize,
        /// Standalone marker and blank lines inserted
        lines_added: usize,
    },
}

/// Result of annotating a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    NoHeadings,
    Annotated {
        output: PathBuf,
        heading_count: usize,
        fold_count: usize,
    },
}

/// Split text into lines, each keeping its `\n` terminator.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// Annotate a whole document held in memory. No I/O.
pub fn annotate_text(text: &str, config: &FoldConfig) -> Result<Annotation, ExtractorError> {
    let lines = split_lines(text);
    let mut extractor = create_extractor(config.extractor)?;
    let headings = extractor.extract(&lines)?;

    if headings.is_empty() {
        log::debug!("{} extractor found no headings", extractor.kind().as_str());
        return Ok(Annotation::NoHeadings);
    }

    let annotated = FoldAnnotator::from_config(config).annotate(&lines, &headings);
    // every fold adds a closing marker line and a blank line
    let lines_added = annotated.len() - lines.len();
    let fold_count = lines_added / 2;

    // headings reported inside a backtick fence are never wrapped
    if fold_count == 0 {
        log::debug!("all {} headings fall inside code fences", headings.len());
        return Ok(Annotation::NoHeadings);
    }

    log::debug!(
        "{} headings, {} folds, {} lines added",
        headings.len(),
        fold_count,
        lines_added
    );

    Ok(Annotation::Annotated {
        content: annotated.concat(),
        heading_count: fold_count,
        fold_count,
        lines_added,
    })
}

/// Read a whole document, mapping a missing file to `FoldError::InputNotFound`.
pub fn read_document(path: &Path) -> Result<String, FoldError> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            FoldError::InputNotFound(path.to_path_buf())
        } else {
            FoldError::ReadFailure {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Add fold markers to `input`, writing to `output` or back to `input`.
///
/// With no headings nothing is written and `FoldOutcome::NoHeadings` is
/// returned. The file is read whole and overwritten whole, so two runs must
/// not target the same path at once.
pub fn add_foldmarks(
    input: &Path,
    output: Option<&Path>,
    config: &FoldConfig,
) -> Result<FoldOutcome, FoldError> {
    let text = read_document(input)?;

    let Annotation::Annotated {
        content,
        heading_count,
        fold_count,
        ..
    } = annotate_text(&text, config)?
    else {
        return Ok(FoldOutcome::NoHeadings);
    };

    let output = output.unwrap_or(input);
    fs::write(output, content).map_err(|source| FoldError::WriteFailure {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(FoldOutcome::Annotated {
        output: output.to_path_buf(),
        heading_count,
        fold_count,
    })
}

/// List the headings and folds `add_foldmarks` would use, without writing.
pub fn list_headings(input: &Path, config: &FoldConfig) -> Result<HeadingList, FoldError> {
    let text = read_document(input)?;
    let lines = split_lines(&text);
    let mut extractor = create_extractor(config.extractor)?;
    let headings = extractor.extract(&lines)?;

    Ok(HeadingList {
        path: input.to_path_buf(),
        extractor: extractor.kind(),
        line_count: lines.len(),
        folds: fold_structure(&headings),
        headings,
    })
}
