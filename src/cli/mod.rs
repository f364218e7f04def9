//! # CLI Module
//!
//! Command-line interface for the media retagger.
//!
//! ## Usage
//! ```bash
//! # Retag everything under a directory
//! retag ~/Pictures
//!
//! # Prompt for the directory
//! retag
//!
//! # Four extraction workers, JSON output
//! retag ~/Pictures --jobs 4 --output json
//!
//! # Only list files that were moved aside
//! retag ~/Pictures --output minimal
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use media_retag::core::pipeline::{FileOutcome, Pipeline, PipelineResult};
use media_retag::core::scanner::DEFAULT_UNDATED_DIR;
use media_retag::error::{Result, RetagError};
use media_retag::events::{Event, EventChannel, PipelineEvent, RetagEvent, ScanEvent};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// Media Retag - set file times from embedded capture dates
#[derive(Parser, Debug)]
#[command(name = "retag")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to process (prompted for when omitted)
    path: Option<PathBuf>,

    /// Name of the folder undated files are moved into
    #[arg(long, default_value = DEFAULT_UNDATED_DIR)]
    undated_dir: String,

    /// Number of extraction workers
    #[arg(short, long, default_value = "1")]
    jobs: usize,

    /// Include hidden files
    #[arg(long)]
    include_hidden: bool,

    /// Output format
    #[arg(short, long, default_value = "pretty")]
    output: OutputFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (moved paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    media_retag::init_tracing(cli.verbose);

    let term = Term::stderr();
    let root = match cli.path {
        Some(path) => path,
        None => prompt_for_path(&term, &mut io::stdin().lock())?,
    };

    if cli.output == OutputFormat::Pretty {
        term.write_line(&format!(
            "{} {}",
            style("Media Retag").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let pipeline = Pipeline::builder()
        .root(root)
        .undated_dir_name(cli.undated_dir)
        .include_hidden(cli.include_hidden)
        .jobs(cli.jobs)
        .build();

    let (sender, receiver) = EventChannel::new();

    let progress = if cli.output == OutputFormat::Pretty {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let verbose = cli.verbose;
    let pretty = cli.output == OutputFormat::Pretty;

    // Handle events in a separate thread
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.set_message(format!("{}", phase));
                    }
                }
                Event::Scan(ScanEvent::Error { path, message }) => {
                    report(&progress_clone, format!(
                        "{} {} {}",
                        style("!").yellow().bold(),
                        path.display(),
                        style(message).dim()
                    ));
                }
                Event::Retag(RetagEvent::Processing { path }) => {
                    if let Some(ref pb) = progress_clone {
                        if verbose {
                            pb.set_message(path.display().to_string());
                        }
                    }
                }
                Event::Retag(event) => {
                    if let Some(ref pb) = progress_clone {
                        pb.inc(1);
                    }
                    if pretty {
                        report(&progress_clone, describe(&event));
                    } else if let RetagEvent::Error { path, message } = event {
                        eprintln!("{}: {}", path.display(), message);
                    }
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    if let Some(ref pb) = progress_clone {
                        pb.finish_and_clear();
                    }
                }
                _ => {}
            }
        }
    });

    let result = pipeline.run_with_events(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let result = result?;
    match cli.output {
        OutputFormat::Pretty => print_pretty_results(&term, &result),
        OutputFormat::Json => print_json_results(&result)?,
        OutputFormat::Minimal => print_minimal_results(&result),
    }

    Ok(())
}

/// Ask for the target directory on stderr and read one line of input
///
/// Input is read with plain line buffering so a piped path works as well
/// as a typed one.
fn prompt_for_path(term: &Term, input: &mut impl BufRead) -> Result<PathBuf> {
    term.write_str("Target path: ")
        .map_err(|e| RetagError::Config(e.to_string()))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| RetagError::Config(e.to_string()))?;

    let line = line.trim();
    if line.is_empty() {
        return Err(RetagError::Config("no target path given".to_string()));
    }
    Ok(PathBuf::from(line))
}

fn report(progress: &Option<ProgressBar>, line: String) {
    match progress {
        Some(pb) => pb.println(line),
        None => eprintln!("{}", line),
    }
}

fn describe(event: &RetagEvent) -> String {
    match event {
        RetagEvent::Tagged { path, timestamp } => format!(
            "{} {} {}",
            style("✓").green(),
            path.display(),
            style(timestamp).cyan()
        ),
        RetagEvent::MovedUndated { from, to } => format!(
            "{} {} {} {}",
            style("→").yellow(),
            from.display(),
            style("moved to").dim(),
            to.display()
        ),
        RetagEvent::Skipped { path, reason } => format!(
            "{} {} {}",
            style("-").dim(),
            path.display(),
            style(reason).dim()
        ),
        RetagEvent::Error { path, message } => format!(
            "{} {} {}",
            style("✗").red().bold(),
            path.display(),
            style(message).red()
        ),
        RetagEvent::Processing { path } => path.display().to_string(),
    }
}

fn print_pretty_results(term: &Term, result: &PipelineResult) {
    term.write_line("").ok();
    term.write_line(&format!("{} Retag Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} media files processed in {:.1}s",
        style(result.total_files).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!("  {} timestamps applied", style(result.tagged).cyan()))
        .ok();
    term.write_line(&format!(
        "  {} undated files moved aside",
        style(result.moved).yellow()
    ))
    .ok();

    if result.skipped > 0 {
        term.write_line(&format!("  {} skipped", style(result.skipped).dim()))
            .ok();
    }

    if result.failed > 0 {
        term.write_line(&format!("  {} failed", style(result.failed).red()))
            .ok();
    }

    if !result.errors.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Errors:").bold().underlined()))
            .ok();
        for error in &result.errors {
            term.write_line(&format!("  {}", error)).ok();
        }
    }
}

fn print_json_results(result: &PipelineResult) -> Result<()> {
    let output = serde_json::to_string_pretty(result)
        .map_err(|e| RetagError::Config(format!("could not serialize result: {}", e)))?;
    println!("{}", output);
    Ok(())
}

fn print_minimal_results(result: &PipelineResult) {
    for outcome in &result.outcomes {
        if let FileOutcome::MovedUndated { to, .. } = outcome {
            println!("{}", to.display());
        }
    }
}
