use std::path::PathBuf;

use clap::{Parser, Subcommand};

use autodrive_shared::*;
use autodrive_sim::{
    run_training, CarEnv, CruisePolicy, CsvSink, DoNothingPolicy, EpisodeSink, NoopSink, Policy,
    TrackWorld,
};

#[derive(Parser)]
#[command(name = "autodrive", about = "Driving-environment training harness")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run training episodes on the reference track
    Run {
        /// Environment preset (p1 = basic, p2 = lane-keeping)
        #[arg(long, default_value = "p2")]
        preset: String,

        /// Policy driving the car (cruise or do_nothing)
        #[arg(long, default_value = "cruise")]
        policy: String,

        /// Number of episodes to run
        #[arg(long, default_value_t = 10)]
        episodes: u32,

        /// Seed for spawn randomization
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Append episode records to this CSV file
        #[arg(long)]
        log: Option<PathBuf>,

        /// Write the run summary as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn resolve_preset(name: &str) -> Result<SimConfig, String> {
    match name {
        "p1" | "phase1" => Ok(SimConfig::phase_one()),
        "p2" | "phase2" => Ok(SimConfig::phase_two()),
        other => Err(format!("unknown preset: {other}")),
    }
}

fn resolve_policy(name: &str, config: &SimConfig) -> Result<Box<dyn Policy>, String> {
    match name {
        "cruise" => Ok(Box::new(CruisePolicy::new(config))),
        "do_nothing" => Ok(Box::new(DoNothingPolicy)),
        other => Err(format!("unknown policy: {other}")),
    }
}

fn main() {
    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Run {
            preset,
            policy,
            episodes,
            seed,
            log,
            output,
        } => {
            let config = resolve_preset(&preset)?;
            let mut policy = resolve_policy(&policy, &config)?;
            let mut env = CarEnv::new(config.clone(), seed)?;
            let mut world = TrackWorld::standard(&config)?;
            let mut sink: Box<dyn EpisodeSink> = match log {
                Some(path) => Box::new(CsvSink::new(path)),
                None => Box::new(NoopSink),
            };

            let summary =
                run_training(&mut env, &mut world, policy.as_mut(), episodes, sink.as_mut());

            println!("episodes:      {}", summary.episodes);
            println!("ticks:         {}", summary.total_ticks);
            println!("mean reward:   {:.3}", summary.mean_reward);
            println!("mean duration: {:.2}s", summary.mean_duration_secs);
            println!(
                "outcomes:      {} timeout / {} wall / {} npc / {} success",
                summary.timeouts,
                summary.wall_collisions,
                summary.npc_collisions,
                summary.successes
            );

            if let Some(path) = output {
                std::fs::write(&path, serde_json::to_string_pretty(&summary)?)?;
                println!("summary written to {}", path.display());
            }
            Ok(())
        }
    }
}
