//! Deadlock Simulator CLI
//!
//! Runs scenarios headlessly and prints reports or banker's matrices.

use clap::{Parser, Subcommand};
use deadsim_avoidance::build_matrices;
use deadsim_engine::{advance, initialize};
use deadsim_simulator::{load_scenario, run_suites, RunConfig, Simulator, VictimPolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deadsim")]
#[command(about = "Deadlock prevention, avoidance and detection simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Stop a run at this tick
    #[arg(long, global = true, default_value = "500")]
    max_ticks: u64,

    /// Stop at the first deadlock instead of aborting a victim
    #[arg(long, global = true)]
    no_auto_abort: bool,

    /// Victim selection on deadlock (first-unfinished, most-held)
    #[arg(long, global = true, default_value = "first-unfinished")]
    victim: String,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the canned reference suites
    Suites,

    /// Run a scenario file
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Report label (defaults to the file name)
        #[arg(long)]
        label: Option<String>,
    },

    /// Advance a scenario and print its banker's matrices as JSON
    Matrices {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Ticks to advance before printing
        #[arg(long, default_value = "0")]
        ticks: u64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let victim_policy: VictimPolicy = cli.victim.parse()?;
    let config = RunConfig::new()
        .with_max_ticks(cli.max_ticks)
        .with_auto_abort(!cli.no_auto_abort)
        .with_victim_policy(victim_policy);
    let simulator = Simulator::new(config);

    match cli.command {
        Commands::Suites => {
            let reports = run_suites(&simulator)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!("{}\n", report);
                }
            }
        }

        Commands::Run { scenario, label } => {
            let label = label.unwrap_or_else(|| scenario.display().to_string());
            let parsed = load_scenario(&scenario)?;
            let run = simulator.run(&label, &parsed)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&run.report)?);
            } else {
                println!("{}", run.report);
            }
        }

        Commands::Matrices { scenario, ticks } => {
            let parsed = load_scenario(&scenario)?;
            let mut session = initialize(&parsed);
            for _ in 0..ticks {
                if session.deadlock || session.all_done() {
                    break;
                }
                session = advance(&session);
            }
            let matrices = build_matrices(&session);
            println!("{}", serde_json::to_string_pretty(&matrices)?);
        }
    }

    Ok(())
}
