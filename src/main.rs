use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use sjf_sim::report::{render_json, render_table};
use sjf_sim::workload::{example_workload, generate_workload, load_workload};
use sjf_sim::{run_simulation, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "sjf-sim")]
#[command(version)]
#[command(about = "Multi-core non-preemptive Shortest-Job-First scheduling simulator")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a simulation and print per-process results
    Run(RunArgs),

    /// Print a reproducible random workload as JSON
    Generate(GenerateArgs),
}

// =============================================================================
// Run Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct RunArgs {
    /// Workload file (.json or .csv). Defaults to the built-in five-process table.
    #[arg(long, short = 'i')]
    input: Option<PathBuf>,

    /// Number of simulated CPU cores
    #[arg(long, short = 'w', default_value = "2")]
    workers: usize,

    /// Real milliseconds per logical time unit (0 runs without delay)
    #[arg(long, default_value = "10")]
    tick_ms: u64,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Generate Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Number of processes
    #[arg(long, short = 'n', default_value = "10")]
    count: usize,

    /// Random seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Latest arrival time
    #[arg(long, default_value = "20")]
    max_arrival: u64,

    /// Longest burst time
    #[arg(long, default_value = "10")]
    max_burst: u64,
}

// =============================================================================
// Command Handlers
// =============================================================================

fn handle_run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let processes = match &args.input {
        Some(path) => load_workload(path)?,
        None => example_workload(),
    };

    let config = SimConfig::new(args.workers).with_tick(Duration::from_millis(args.tick_ms));

    tracing::info!(
        processes = processes.len(),
        workers = config.workers,
        tick = ?config.tick,
        input = ?args.input,
        "Starting simulation"
    );

    let outcome = run_simulation(processes, &config)?;
    let summary = outcome.summary();

    match args.output {
        OutputFormat::Table => print!("{}", render_table(&summary)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&summary, outcome.makespan(), &outcome.dispatch_log)?
        ),
    }
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let processes = generate_workload(args.count, args.seed, args.max_arrival, args.max_burst);
    println!("{}", serde_json::to_string_pretty(&processes)?);
    Ok(())
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never mix with the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => handle_run(run_args)?,
        Commands::Generate(generate_args) => handle_generate(generate_args)?,
    }

    Ok(())
}
