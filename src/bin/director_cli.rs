use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eris_director::director::config::DirectorConfig;
use eris_director::director::scenario::{RunTrace, Scenario, ScenarioRunner};

#[derive(Parser)]
#[command(name = "director-cli")]
#[command(about = "Runs and replays director scenarios against the synthetic world")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file and print (or save) its RunTrace.
    Run {
        scenario: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Re-run a scenario and verify the trace matches a previously recorded one.
    Replay {
        scenario: PathBuf,
        trace: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn load_scenario(path: &PathBuf) -> anyhow::Result<Scenario> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn load_config(path: &Option<PathBuf>) -> anyhow::Result<DirectorConfig> {
    Ok(DirectorConfig::load(path.as_deref())?)
}

fn print_summary(trace: &RunTrace) {
    println!("scenario: {}  run_id: {}", trace.scenario_name, trace.run_id);
    println!(
        "events: {}  tool_calls: {}  eris_interventions: {}  duration: {:.1}s",
        trace.total_events,
        trace.total_tool_calls,
        trace.eris_interventions,
        trace.duration.as_secs_f64()
    );
    println!("victory: {}  deaths: {}", trace.victory, trace.deaths);
    println!("final phase: {:?}  fracture: {:.1}", trace.final_phase, trace.final_fracture);
}

fn main() -> anyhow::Result<()> {
    eris_director::director::telemetry::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, output, config } => {
            let scenario = load_scenario(&scenario)?;
            let config = load_config(&config)?;
            let runner = ScenarioRunner { config, ..ScenarioRunner::default() };
            let trace = runner.run(&scenario);
            print_summary(&trace);
            if let Some(output) = output {
                std::fs::write(output, serde_json::to_string_pretty(&trace)?)?;
            }
        }
        Commands::Replay { scenario, trace, config } => {
            let scenario = load_scenario(&scenario)?;
            let config = load_config(&config)?;
            let recorded: RunTrace = serde_json::from_str(&std::fs::read_to_string(trace)?)?;
            let runner = ScenarioRunner { config, ..ScenarioRunner::default() };
            if runner.replay_matches(&scenario, &recorded) {
                println!("replay matches recorded trace");
            } else {
                println!("replay DIVERGED from recorded trace");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
