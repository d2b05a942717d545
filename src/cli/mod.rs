//! # CLI Module
//!
//! Command-line interface for the focus scanner.
//!
//! ## Usage
//! ```bash
//! # Rank the sharp photos in a folder
//! focus-scan scan ~/Photos
//!
//! # Stricter threshold, half the machine
//! focus-scan scan ~/Photos --threshold 400 --cpu 50
//!
//! # JSON output
//! focus-scan scan ~/Photos --output json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use focus_scan::core::aggregator::RankedResultSet;
use focus_scan::core::controller::{
    parse_threshold, ScanController, ScanObserver, ScanRequest, ScanState, DEFAULT_CPU_PERCENT,
};
use focus_scan::core::enumerator::EnumeratorConfig;
use focus_scan::core::scheduler::CancellationToken;
use focus_scan::core::scorer::ScorerConfig;
use focus_scan::error::{FocusScanError, InputError, Result};
use focus_scan::events::{ScanProgress, ScanSummary, SessionId};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Focus Scan - find the sharp photos in a folder
#[derive(Parser, Debug)]
#[command(name = "focus-scan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every photo under a folder and list the in-focus ones
    Scan {
        /// Folder to scan
        folder: PathBuf,

        /// Minimum focus score to keep a photo (higher = stricter)
        #[arg(short, long, default_value = "200")]
        threshold: String,

        /// Percentage of CPU to use
        #[arg(short, long, default_value_t = DEFAULT_CPU_PERCENT as i64, allow_negative_numbers = true)]
        cpu: i64,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Skip hidden files and folders
        #[arg(long)]
        exclude_hidden: bool,

        /// Follow symbolic links
        #[arg(long)]
        follow_symlinks: bool,

        /// Maximum folder depth
        #[arg(long)]
        max_depth: Option<usize>,

        /// Downscale photos so the longest side is at most this many pixels
        /// before scoring
        #[arg(long)]
        analysis_size: Option<u32>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
    /// Minimal output (paths only)
    Minimal,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    focus_scan::init_tracing();

    match cli.command {
        Commands::Scan {
            folder,
            threshold,
            cpu,
            output,
            exclude_hidden,
            follow_symlinks,
            max_depth,
            analysis_size,
            verbose,
        } => {
            let request = ScanRequest {
                folder: Some(folder),
                threshold: parse_threshold(&threshold)?,
                cpu_percent: u32::try_from(cpu)
                    .ok()
                    .filter(|&p| p > 0)
                    .ok_or(InputError::InvalidCpuPercent { value: cpu })?,
            };

            let enumerator = EnumeratorConfig {
                follow_symlinks,
                include_hidden: !exclude_hidden,
                max_depth,
            };

            run_scan(request, enumerator, ScorerConfig { analysis_size }, output, verbose)
        }
    }
}

fn run_scan(
    request: ScanRequest,
    enumerator: EnumeratorConfig,
    scorer: ScorerConfig,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    let term = Term::stderr();

    if matches!(output, OutputFormat::Pretty) {
        term.write_line(&format!(
            "{} {}",
            style("Focus Scan").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let mut controller = ScanController::builder()
        .enumerator(enumerator)
        .scorer_config(scorer)
        .build();

    // Ctrl-C stops the scan instead of killing the process mid-bar
    let interrupt = CancellationToken::new();
    let handler = interrupt.clone();
    ctrlc::set_handler(move || {
        handler.cancel();
    })
    .map_err(|e| FocusScanError::Config(format!("failed to set Ctrl-C handler: {e}")))?;

    controller.start(request)?;

    let mut observer = CliObserver::new(term.clone(), output, verbose);
    let state = controller.run_until(&mut observer, &interrupt);

    match (state, observer.finished) {
        (ScanState::Completed, Some((results, summary))) => {
            match output {
                OutputFormat::Pretty => print_pretty_results(&term, &results, &summary, verbose),
                OutputFormat::Json => print_json_results(&results, &summary),
                OutputFormat::Minimal => print_minimal_results(&results),
            }
            Ok(())
        }
        (ScanState::Stopped, _) => {
            if observer.progress.is_none() {
                term.write_line("Scan stopped.").ok();
            }
            Ok(())
        }
        _ => Err(FocusScanError::Config(format!(
            "scan ended in state {state} without results"
        ))),
    }
}

/// Drives the progress bar while the scan runs and keeps the final result.
struct CliObserver {
    term: Term,
    progress: Option<ProgressBar>,
    verbose: bool,
    finished: Option<(RankedResultSet, ScanSummary)>,
}

impl CliObserver {
    fn new(term: Term, output: OutputFormat, verbose: bool) -> Self {
        let progress = matches!(output, OutputFormat::Pretty).then(|| {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▓░"),
            );
            pb
        });

        Self {
            term,
            progress,
            verbose,
            finished: None,
        }
    }
}

impl ScanObserver for CliObserver {
    fn on_started(&mut self, _session: SessionId, root: &Path, total: usize, workers: usize) {
        if let Some(ref pb) = self.progress {
            pb.set_length(total as u64);
            pb.set_message(format!("Scanning {}", display_path(root)));
        }
        if self.verbose {
            self.term
                .write_line(&format!(
                    "  {} files, {} workers",
                    style(total).cyan(),
                    style(workers).cyan()
                ))
                .ok();
        }
    }

    fn on_progress(&mut self, progress: &ScanProgress) {
        if let Some(ref pb) = self.progress {
            pb.set_position(progress.completed as u64);
            if self.verbose {
                pb.set_message(
                    progress
                        .current_path
                        .file_name()
                        .unwrap_or_default()
                        .to_string_lossy()
                        .to_string(),
                );
            }
        }
    }

    fn on_score_failed(&mut self, path: &Path, message: &str) {
        if !self.verbose {
            return;
        }
        let line = format!("  {} {}: {}", style("!").yellow(), display_path(path), message);
        match self.progress {
            Some(ref pb) => pb.println(line),
            None => {
                self.term.write_line(&line).ok();
            }
        }
    }

    fn on_completed(&mut self, results: &RankedResultSet, summary: &ScanSummary) {
        if let Some(ref pb) = self.progress {
            pb.finish_and_clear();
        }
        self.finished = Some((results.clone(), summary.clone()));
    }

    fn on_stopped(&mut self, _session: SessionId) {
        if let Some(ref pb) = self.progress {
            pb.abandon_with_message("Scan stopped.");
        }
    }
}

fn print_pretty_results(term: &Term, results: &RankedResultSet, summary: &ScanSummary, verbose: bool) {
    term.write_line(&format!(
        "{} Found {} in-focus images.",
        style("✓").green().bold(),
        style(results.len()).cyan()
    ))
    .ok();

    if verbose {
        term.write_line(&format!(
            "  {} photos scored in {:.1}s ({} unreadable, {} entries skipped)",
            style(summary.total_files).cyan(),
            summary.duration_ms as f64 / 1000.0,
            style(summary.failed).yellow(),
            style(summary.skipped).yellow()
        ))
        .ok();
    }
    term.write_line("").ok();

    // Results go to stdout so they can be piped
    for result in results {
        let name = if verbose {
            display_path(result.path.as_path())
        } else {
            result.path.file_name()
        };
        println!("{:.1} - {}", result.score, name);
    }
}

fn print_json_results(results: &RankedResultSet, summary: &ScanSummary) {
    let output = serde_json::json!({
        "total_files": summary.total_files,
        "in_focus": summary.in_focus,
        "failed": summary.failed,
        "skipped": summary.skipped,
        "workers": summary.workers,
        "duration_ms": summary.duration_ms,
        "results": results,
    });

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_minimal_results(results: &RankedResultSet) {
    for result in results {
        println!("{}", result.path);
    }
}

/// Show paths under the home folder as `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}
