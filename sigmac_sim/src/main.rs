//! Sigma_c Simulator CLI
//!
//! Run the candidate builder and the truth matcher over generated events.

use clap::Parser;
use sigmac_core::SigmacConfig;
use sigmac_sim::scenarios::ScenarioId;
use sigmac_sim::{ScenarioResult, ScenarioRunner, SimError, SimExport};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Sigma_c candidate builder simulation CLI
#[derive(Parser, Debug)]
#[command(name = "sigmac-sim")]
#[command(about = "Run Sigma_c reconstruction scenarios on generated events", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Events per scenario
    #[arg(short, long, default_value = "100")]
    events: u64,

    /// Scenario to run (prompt_signal, feed_down, resonant, background, charge_corruption, mixed, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Builder configuration as JSON (missing keys keep their defaults)
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export tables and report of a single scenario to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Data mode: build candidates without truth matching
    #[arg(long)]
    no_mc: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if let Err(e) = run(&args) {
        error!(fatal = true, "{}", e);
        std::process::exit(2);
    }
}

fn run(args: &Args) -> Result<(), SimError> {
    if !args.json {
        info!("Sigma_c Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!(
                    "Available scenarios: {}, all",
                    ScenarioId::all().iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
                );
                std::process::exit(1);
            }
        }
    };

    if args.export.is_some() && scenarios.len() > 1 {
        eprintln!("Error: --export only supports a single scenario, not 'all'");
        std::process::exit(1);
    }

    let config = match &args.config {
        Some(path) => {
            info!("Loading builder config from {}", path);
            SigmacConfig::from_json_file(path)?
        }
        None => SigmacConfig::default(),
    };

    // Determine base seed
    let seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner = ScenarioRunner::new(seed, args.events)
        .with_config(config)
        .with_mc(!args.no_mc);

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for scenario in &scenarios {
        let result = runner.run(*scenario)?;

        if !args.json {
            if result.passed {
                info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
            } else {
                error!(
                    "✗ {} (seed={}) FAILED: {}",
                    scenario.name(),
                    seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
            if args.verbose {
                result.report.print();
            }
        }

        if let Some(path) = &args.export {
            let export = SimExport::new(&result, runner.config(), !args.no_mc);
            export.write_to_file(path)?;
            info!(
                "Exported {} candidates to {} (run {})",
                result.tables.candidates.len(),
                path,
                export.run_id
            );
        }

        all_results.push(result);
    }

    // Summary
    let total = all_results.len();
    let failed_count = all_results.iter().filter(|r| !r.passed).count();

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed_count,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "events": r.events,
                    "candidates": r.tables.candidates.len(),
                    "efficiency": r.report.global_metrics.efficiency(),
                    "charge_violations": r.report.global_metrics.charge_violations(),
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}
