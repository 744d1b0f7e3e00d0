//! Headless Auto-Resolve Runner
//!
//! Resolves a scenario (or the built-in demo) and prints the outcome, or a
//! win-rate summary when run as a batch.

use std::process::ExitCode;

use acar::core::{AcarError, AutoResolveConfig};
use acar::scenario::Scenario;
use acar::simulation::{run_batch, run_scenario, AutoResolveConcludedEvent, BatchSummary};
use clap::Parser;
use serde::Serialize;

/// Headless Auto-Resolve Runner - abstract combat resolution without a map
#[derive(Parser, Debug)]
#[command(name = "acar_runner")]
#[command(about = "Auto-resolve a battle scenario and report the outcome")]
struct Args {
    /// Scenario JSON file; the built-in demo is used when omitted
    #[arg(long)]
    scenario: Option<String>,

    /// Tuning file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of battles to run; above 1 prints a batch summary
    #[arg(long, default_value_t = 1)]
    batch: usize,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print the round-by-round report
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output of a single battle
#[derive(Serialize)]
struct BattleResult<'a> {
    scenario: &'a str,
    seed: u64,
    #[serde(flatten)]
    event: &'a AutoResolveConcludedEvent,
}

/// JSON output of a batch
#[derive(Serialize)]
struct BatchResult<'a> {
    scenario: &'a str,
    base_seed: u64,
    #[serde(flatten)]
    summary: &'a BatchSummary,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("acar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), AcarError> {
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo(),
    };
    let config = match &args.config {
        Some(path) => AutoResolveConfig::load(path)?,
        None => AutoResolveConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);

    if args.batch > 1 {
        let summary = run_batch(&scenario, &config, seed, args.batch)?;
        if args.format == "text" {
            print_batch(&scenario, &summary);
        } else {
            let result = BatchResult {
                scenario: &scenario.name,
                base_seed: seed,
                summary: &summary,
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        return Ok(());
    }

    let event = run_scenario(&scenario, &config, seed)?;
    if args.format == "text" {
        print_battle(&scenario, seed, &event, args.verbose);
    } else {
        let result = BattleResult {
            scenario: &scenario.name,
            seed,
            event: &event,
        };
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

fn print_battle(scenario: &Scenario, seed: u64, event: &AutoResolveConcludedEvent, verbose: bool) {
    println!("=== {} (seed {}) ===", scenario.name, seed);

    if verbose {
        for line in &event.report {
            println!("  [{:>2} {:<10}] {}", line.round, line.phase.to_string(), line.text);
        }
        println!();
    }

    match event.controlling_team {
        Some(team) => println!("Team {} controls the field after {} rounds", team.0, event.rounds),
        None if event.hit_round_cap => println!("Broken off at the round cap ({} rounds)", event.rounds),
        None => println!("No one controls the field after {} rounds", event.rounds),
    }

    let categories = [
        ("Survivors", event.survivors().iter().collect::<Vec<_>>()),
        ("Graveyard", event.graveyard()),
        ("Retreated", event.retreated()),
        ("Devastated", event.devastated()),
        ("Captured", event.captured()),
    ];
    for (label, entities) in categories {
        if entities.is_empty() {
            continue;
        }
        println!("{} ({}):", label, entities.len());
        for entity in entities {
            println!("  {} [{:?}] player {}", entity.name, entity.kind, entity.owner.0);
        }
    }
}

fn print_batch(scenario: &Scenario, summary: &BatchSummary) {
    println!("=== {} x{} ===", scenario.name, summary.battles);
    for (team, wins) in &summary.wins {
        println!(
            "Team {}: {} wins ({:.1}%)",
            team.0,
            wins,
            summary.win_rate(*team) * 100.0
        );
    }
    println!("Uncontrolled: {} ({} at round cap)", summary.uncontrolled, summary.round_capped);
    println!("Average rounds: {:.2}", summary.average_rounds);
}
