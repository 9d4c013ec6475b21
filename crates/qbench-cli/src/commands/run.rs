//! Run command implementation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use qbench_core::export::{self, ExportConfig, ExportFormat};
use qbench_core::{BenchmarkRecord, BenchmarkReport, RowStatus, RunObserver, render_table};

use super::common::{default_registry, load_circuit, load_config};

/// Output written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Arguments of `qbench run`.
#[derive(Debug, Clone, PartialEq, clap::Args)]
pub struct RunArgs {
    /// OpenQASM 2.0 circuit file
    pub input: PathBuf,

    /// Backends to run, comma separated (defaults to the configured list)
    #[arg(short, long, value_delimiter = ',')]
    pub backends: Vec<String>,

    /// Number of shots for sampling backends
    #[arg(short, long)]
    pub shots: Option<u32>,

    /// Seed for sampling backends
    #[arg(long)]
    pub seed: Option<u64>,

    /// Backend used as the fidelity baseline
    #[arg(long)]
    pub ground_truth: Option<String>,

    /// Seconds to wait for hardware jobs before reporting them as queued
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Configuration file (YAML)
    #[arg(short, long, env = "QBENCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stdout format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Export only the sanitized rows instead of the full report
    #[arg(long)]
    pub rows: bool,
}

/// Spinner that follows the orchestrator through the plan.
struct Progress {
    spinner: ProgressBar,
}

impl Progress {
    fn new(quiet: bool) -> Self {
        let spinner = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(template);
        }
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }
}

impl RunObserver for Progress {
    fn backend_started(&mut self, name: &str, position: usize, total: usize) {
        self.spinner
            .set_message(format!("[{}/{}] Running {}...", position + 1, total, name));
    }

    fn backend_finished(&mut self, record: &BenchmarkRecord) {
        let row = qbench_core::ReportRow::from(record);
        let mark = match row.status {
            RowStatus::Ok => style("✓").green().bold(),
            RowStatus::Queued => style("…").yellow().bold(),
            RowStatus::Error => style("✗").red().bold(),
        };
        self.spinner.println(format!(
            "  {} {} ({:.3}s)",
            mark,
            style(&row.backend_name).bold(),
            row.total_latency
        ));
    }
}

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(shots) = args.shots {
        config.shots = shots;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(ground_truth) = &args.ground_truth {
        config.ground_truth.clone_from(ground_truth);
    }
    if let Some(timeout) = args.timeout {
        config.hardware_timeout_seconds = timeout;
    }
    if !args.backends.is_empty() {
        config.default_backends.clone_from(&args.backends);
    }
    config.validate().context("Invalid command-line options")?;
    debug!("Effective configuration: {:?}", config);

    let json = args.format == OutputFormat::Json;
    let input = load_circuit(&args.input)?;
    if !json {
        println!(
            "{} Benchmarking {} on {}",
            style("→").cyan().bold(),
            style(args.input.display()).green(),
            style(config.default_backends.join(", ")).yellow()
        );
        println!(
            "  Loaded: {} qubits, {} gates, depth {}",
            input.summary.num_qubits, input.summary.gate_count, input.summary.depth
        );
    }

    let orchestrator = config.orchestrator(default_registry());
    let mut progress = Progress::new(json);
    let records = orchestrator
        .run_observed(&input.circuit, &config.default_backends, &mut progress)
        .await?;
    progress.spinner.finish_and_clear();

    let report = BenchmarkReport::new(input.summary, orchestrator.options(), records);
    let export_config = ExportConfig {
        pretty: true,
        format: if args.rows {
            ExportFormat::Rows
        } else {
            ExportFormat::Report
        },
    };

    match args.format {
        OutputFormat::Table => print_summary(&report),
        OutputFormat::Json => println!("{}", export::to_json(&report, &export_config)?),
    }

    if let Some(path) = &args.output {
        write_report(&report, path, &export_config)?;
        if !json {
            println!(
                "\n{} Report written to {}",
                style("✓").green().bold(),
                style(path.display()).cyan()
            );
        }
    }

    Ok(())
}

fn print_summary(report: &BenchmarkReport) {
    println!();
    print!("{}", render_table(&report.rows()));

    match report.baseline() {
        Some(baseline) => println!(
            "\n  Baseline: {}",
            style(&baseline.backend_name).cyan()
        ),
        None => println!(
            "\n  {} No baseline: fidelity unavailable",
            style("!").yellow().bold()
        ),
    }
    if report.failures() > 0 {
        println!(
            "  {} {} backend(s) failed",
            style("✗").red().bold(),
            report.failures()
        );
    }
}

fn write_report(report: &BenchmarkReport, path: &Path, config: &ExportConfig) -> Result<()> {
    export::to_file(report, path, config)
        .with_context(|| format!("Failed to export report to {}", path.display()))
}
