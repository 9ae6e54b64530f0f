use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mdfold_core::{
    add_foldmarks, annotate_text, format_headings, format_report, list_headings, read_document,
    Annotation, CloseOrder, ExtractorKind, FoldConfig, FoldOutcome, MarkdownScanner, OutputFormat,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const NO_HEADINGS_WARNING: &str = "Warning: No headings found in the file.";

#[derive(Parser)]
#[command(name = "mta-mdfold")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Add Vim fold markers to markdown headings")]
#[command(long_about = "Wraps every markdown heading section in Vim fold markers so the \
    document can be navigated with foldmethod=marker (for example as slides in Neovim).\n\n\
    - '# Title' becomes '# Title <!-- {{{0 -->'\n\
    - a heading closes every open section at the same or a deeper level\n\
    - headings inside ``` fenced code blocks are left alone\n\n\
    The file is rewritten in place unless OUTPUT is given. Running the tool twice \
    on the same file wraps every heading a second time.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Markdown file to annotate
    pub input: Option<PathBuf>,

    /// Output file (defaults to overwriting INPUT)
    pub output: Option<PathBuf>,

    /// Heading extraction strategy
    #[arg(long, value_enum, global = true)]
    pub extractor: Option<ExtractorArg>,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the annotated document instead of writing it
    #[arg(long)]
    pub stdout: bool,

    /// Close folds at end of document with marker then blank line
    #[arg(long, global = true)]
    pub unified_close: bool,

    /// Show debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the headings and folds of a file without changing it
    List {
        /// File to analyze
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Summary)]
        format: OutputFormatArg,
    },

    /// Annotate every markdown file under a directory
    Scan {
        /// Root directory to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormatArg::Summary)]
        format: OutputFormatArg,

        /// Report file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Additional ignore patterns (glob style)
        #[arg(long, action = clap::ArgAction::Append)]
        ignore: Vec<String>,

        /// Include hidden files and directories
        #[arg(long)]
        include_hidden: bool,

        /// Parallel threads (0 = auto)
        #[arg(long)]
        threads: Option<usize>,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ExtractorArg {
    /// Line scanning with a regex
    Line,
    /// tree-sitter markdown grammar
    TreeSitter,
}

impl From<ExtractorArg> for ExtractorKind {
    fn from(arg: ExtractorArg) -> Self {
        match arg {
            ExtractorArg::Line => ExtractorKind::Line,
            ExtractorArg::TreeSitter => ExtractorKind::TreeSitter,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Summary,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Yaml => OutputFormat::Yaml,
            OutputFormatArg::Summary => OutputFormat::Summary,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let config = build_config(&args)?;

    match &args.command {
        Some(Commands::List { file, format }) => run_list(file, *format, &config),
        Some(Commands::Scan {
            path,
            format,
            output,
            ignore,
            include_hidden,
            threads,
            dry_run,
        }) => {
            let mut config = config;
            config.ignore_patterns.extend(ignore.iter().cloned());
            if *include_hidden {
                config.include_hidden = true;
            }
            if let Some(threads) = threads {
                config.threads = *threads;
            }
            run_scan(
                path.clone(),
                *format,
                output.as_deref(),
                *dry_run,
                config,
                &args,
            )
        }
        None => run_annotate(&args, &config),
    }
}

/// Config file first, then command line overrides
fn build_config(args: &Args) -> anyhow::Result<FoldConfig> {
    let mut config = match &args.config {
        Some(path) => FoldConfig::load_from_path(path)?,
        None => FoldConfig::default(),
    };

    if let Some(extractor) = args.extractor {
        config = config.with_extractor(extractor.into());
    }
    if args.unified_close {
        config = config.with_close_order(CloseOrder::Unified);
    }

    log::debug!("using {} extractor", config.extractor.as_str());
    Ok(config)
}

fn run_annotate(args: &Args, config: &FoldConfig) -> anyhow::Result<()> {
    let Some(input) = args.input.as_deref() else {
        Args::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "an INPUT file is required unless a subcommand is given",
            )
            .exit();
    };

    if args.stdout {
        let text = read_document(input)?;
        let annotation = annotate_text(&text, config)?;
        let (document, warning) = stdout_document(text, annotation);
        if let Some(warning) = warning {
            eprintln!("{}", warning);
        }
        print!("{}", document);
        return Ok(());
    }

    let outcome = add_foldmarks(input, args.output.as_deref(), config)?;
    if let FoldOutcome::Annotated {
        heading_count,
        fold_count,
        ..
    } = &outcome
    {
        log::info!("{} headings, {} folds", heading_count, fold_count);
    }

    match outcome_notice(&outcome) {
        Notice::Success(message) => println!("{}", message),
        Notice::Warning(message) => eprintln!("{}", message),
    }

    Ok(())
}

/// Line reported after annotating a file
#[derive(Debug, PartialEq, Eq)]
enum Notice {
    /// Goes to stdout
    Success(String),
    /// Goes to stderr
    Warning(&'static str),
}

fn outcome_notice(outcome: &FoldOutcome) -> Notice {
    match outcome {
        FoldOutcome::NoHeadings => Notice::Warning(NO_HEADINGS_WARNING),
        FoldOutcome::Annotated { output, .. } => Notice::Success(format!(
            "Successfully added foldmarks to '{}'",
            output.display()
        )),
    }
}

/// Document printed by `--stdout`: the input itself when there is nothing to
/// fold, together with the warning for stderr
fn stdout_document(text: String, annotation: Annotation) -> (String, Option<&'static str>) {
    match annotation {
        Annotation::NoHeadings => (text, Some(NO_HEADINGS_WARNING)),
        Annotation::Annotated { content, .. } => (content, None),
    }
}

fn run_list(file: &Path, format: OutputFormatArg, config: &FoldConfig) -> anyhow::Result<()> {
    let list = list_headings(file, config)?;
    if list.headings.is_empty() {
        eprintln!("{}", NO_HEADINGS_WARNING);
    }

    let output = format_headings(&list, format.into())?;
    println!("{}", output);
    Ok(())
}

fn run_scan(
    path: PathBuf,
    format: OutputFormatArg,
    output_file: Option<&Path>,
    dry_run: bool,
    config: FoldConfig,
    args: &Args,
) -> anyhow::Result<()> {
    let spinner = if args.verbose {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("invalid spinner template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {}...", path.display()));
        Some(pb)
    } else {
        None
    };

    let scanner = MarkdownScanner::new(path, config)?;
    let report = scanner.scan(dry_run)?;

    if let Some(ref pb) = spinner {
        pb.finish_with_message(format!(
            "Annotated {} of {} files in {}ms",
            report.stats.annotated_files,
            report.stats.total_files,
            report.metadata.scan_duration_ms
        ));
    }

    let output = format_report(&report, format.into())?;

    if let Some(path) = output_file {
        fs::write(path, &output)
            .with_context(|| format!("Error writing report '{}'", path.display()))?;
        if args.verbose {
            eprintln!("Report written to: {}", path.display());
        }
    } else {
        println!("{}", output);
    }

    if report.stats.failed_files > 0 {
        anyhow::bail!(
            "{} file(s) could not be annotated",
            report.stats.failed_files
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_annotate_args() {
        let args = Args::try_parse_from([
            "mta-mdfold",
            "--extractor",
            "tree-sitter",
            "--unified-close",
            "in.md",
            "out.md",
        ])
        .unwrap();

        assert!(args.command.is_none());
        assert_eq!(args.input, Some(PathBuf::from("in.md")));
        assert_eq!(args.output, Some(PathBuf::from("out.md")));

        let config = build_config(&args).unwrap();
        assert_eq!(config.extractor, ExtractorKind::TreeSitter);
        assert_eq!(config.close_order, CloseOrder::Unified);
    }

    #[test]
    fn test_subcommand_args() {
        let args = Args::try_parse_from(["mta-mdfold", "list", "doc.md", "-f", "json"]).unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::List {
                format: OutputFormatArg::Json,
                ..
            })
        ));

        let args = Args::try_parse_from(["mta-mdfold", "scan", "--dry-run", "--threads", "1"])
            .unwrap();
        assert!(matches!(
            args.command,
            Some(Commands::Scan {
                dry_run: true,
                threads: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn test_outcome_notice() {
        let outcome = FoldOutcome::Annotated {
            output: PathBuf::from("slides.md"),
            heading_count: 2,
            fold_count: 2,
        };
        assert_eq!(
            outcome_notice(&outcome),
            Notice::Success("Successfully added foldmarks to 'slides.md'".to_string())
        );
        assert_eq!(
            outcome_notice(&FoldOutcome::NoHeadings),
            Notice::Warning("Warning: No headings found in the file.")
        );
    }

    #[test]
    fn test_stdout_document_annotated() {
        let config = FoldConfig::default();
        let annotation = annotate_text("# A\n", &config).unwrap();

        let (document, warning) = stdout_document("# A\n".to_string(), annotation);
        assert_eq!(document, "# A <!-- {{{0 -->\n\n<!-- }}}0 -->\n");
        assert_eq!(warning, None);
    }

    #[test]
    fn test_stdout_document_without_headings() {
        let text = "plain\n```\n# fenced\n```\n".to_string();
        let annotation = annotate_text(&text, &FoldConfig::default()).unwrap();

        let (document, warning) = stdout_document(text.clone(), annotation);
        assert_eq!(document, text);
        assert_eq!(warning, Some(NO_HEADINGS_WARNING));
    }
}
