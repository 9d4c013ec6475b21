//! qbench command-line interface
//!
//! Runs one OpenQASM 2.0 circuit across several backends and prints a
//! comparison table or a JSON report.
//!
//! ```text
//! qbench run bell.qasm --backends statevector,unitary,sampler --shots 2048
//! qbench run ghz.qasm -b statevector,quantinuum --timeout 120 -o report.json
//! qbench backends
//! qbench config --config qbench.yaml
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::run::RunArgs;

/// qbench - cross-backend quantum circuit benchmarking
#[derive(Parser)]
#[command(name = "qbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark a circuit across backends
    Run(RunArgs),

    /// List registered backends and their capabilities
    Backends {
        /// Configuration file (YAML)
        #[arg(short, long, env = "QBENCH_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Configuration file (YAML)
        #[arg(short, long, env = "QBENCH_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => commands::run::execute(&args).await,
        Commands::Backends { config } => commands::backends::execute(config.as_deref()).await,
        Commands::Config { config } => commands::config::execute(config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
