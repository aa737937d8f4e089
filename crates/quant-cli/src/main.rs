mod interpreter;
mod parser;

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use quant_core::QuantSystem;

#[derive(Parser)]
#[command(
    name = "quant",
    about = "Interpret history declarations, energies and merges line by line"
)]
struct Cli {
    /// Read commands from this file instead of stdin
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long)]
    verbose: bool,

    /// Print a JSON occupancy report to stderr after the last command
    #[arg(long)]
    stats: bool,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut system = QuantSystem::new();
    let stdout = BufWriter::new(io::stdout().lock());
    let stderr = io::stderr();

    let summary = match &cli.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            interpreter::run(&mut system, BufReader::new(file), stdout, stderr)?
        }
        None => interpreter::run(&mut system, io::stdin().lock(), stdout, stderr)?,
    };
    tracing::info!(
        executed = summary.executed,
        errors = summary.errors,
        "input exhausted"
    );

    if cli.stats {
        let report =
            serde_json::to_string(&system.stats()).context("failed to serialize stats")?;
        eprintln!("{report}");
    }
    Ok(())
}
