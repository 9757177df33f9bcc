//! `autobrake-cli` – command line front end for the collision predictor.
//!
//! ```text
//! autobrake check  --scan scan.json --steering -0.2 --velocity 1.1 [--json]
//! autobrake replay --frames drive.jsonl [--json]
//! autobrake config [--write]
//! ```
//!
//! Every command reads `autobrake.toml` from the working directory (or the
//! file given with `--config`) and applies `AUTOBRAKE_*` overrides on top.
//! `check` exits with status 2 when the vehicle should brake.

mod config;
mod replay;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use autobrake_middleware::EventBus;
use autobrake_runtime::AutobrakeNode;
use autobrake_types::{BrakeVerdict, KinematicState, RangeScan};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use crate::config::Config;
use crate::replay::FrameOutcome;

/// Exit status of `check` when the verdict is to brake.
const EXIT_BRAKE: u8 = 2;

/// Emergency-brake predictor for Ackermann vehicles
#[derive(Parser)]
#[command(name = "autobrake")]
#[command(about = "Predict obstacle collisions from a planar range scan", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a single scan
    Check {
        /// JSON file holding one range scan
        #[arg(long)]
        scan: PathBuf,

        /// Commanded steering angle (radians, positive turns right)
        #[arg(long, allow_negative_numbers = true)]
        steering: f64,

        /// Forward velocity (m/s)
        #[arg(long)]
        velocity: f64,

        /// Print the verdict as JSON
        #[arg(long)]
        json: bool,
    },

    /// Feed recorded frames through the brake node
    Replay {
        /// JSON Lines file, one `{steering_angle, velocity, scan}` per line
        #[arg(long)]
        frames: PathBuf,

        /// Print one JSON object per frame
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config {
        /// Save it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = autobrake_runtime::init_tracing("autobrake");

    let cfg = config::load(&cli.config).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Check {
            scan,
            steering,
            velocity,
            json,
        } => check(&cfg, &scan, KinematicState::new(steering, velocity), json),
        Commands::Replay { frames, json } => run_replay(&cfg, &frames, json),
        Commands::Config { write } => show_config(&cfg, &cli.config, write),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn check(cfg: &Config, scan_path: &Path, state: KinematicState, json: bool) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(scan_path)
        .with_context(|| format!("Failed to read scan at {}", scan_path.display()))?;
    let scan: RangeScan = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse scan at {}", scan_path.display()))?;

    let predictor = cfg.predictor()?;
    let verdict = predictor.predict(&scan, &state)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&verdict);
    }

    Ok(if verdict.should_brake {
        ExitCode::from(EXIT_BRAKE)
    } else {
        ExitCode::SUCCESS
    })
}

fn run_replay(cfg: &Config, frames_path: &Path, json: bool) -> Result<ExitCode> {
    let raw = std::fs::read_to_string(frames_path)
        .with_context(|| format!("Failed to read frames at {}", frames_path.display()))?;
    let frames = replay::parse_frames(&raw).map_err(anyhow::Error::msg)?;

    let node = AutobrakeNode::new(cfg.predictor()?, EventBus::default())
        .with_debouncer(cfg.debouncer());

    // Tracing is already set up, so the runtime is built only now.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start Tokio runtime")?;
    let outcomes = runtime.block_on(replay::replay(node, &frames))?;

    let mut braking_frames = 0;
    for (index, outcome) in outcomes.iter().enumerate() {
        if matches!(outcome, FrameOutcome::Verdict(v) if v.should_brake) {
            braking_frames += 1;
        }
        if json {
            let line = serde_json::json!({ "frame": index, "outcome": outcome });
            println!("{line}");
        } else {
            print!("  {:>5}  ", index);
            match outcome {
                FrameOutcome::Verdict(verdict) => print_verdict(verdict),
                FrameOutcome::Fault(message) => println!("{} {}", "FAULT".yellow().bold(), message),
            }
        }
    }
    info!(frames = outcomes.len(), braking_frames, "replay summary");
    Ok(ExitCode::SUCCESS)
}

fn show_config(cfg: &Config, path: &Path, write: bool) -> Result<ExitCode> {
    print!("{}", toml::to_string_pretty(cfg)?);
    if write {
        config::save_to(cfg, path).map_err(anyhow::Error::msg)?;
        println!(
            "\n  {} Config saved to {}",
            "✓".green().bold(),
            path.display().to_string().bold()
        );
    }
    Ok(ExitCode::SUCCESS)
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn print_verdict(verdict: &BrakeVerdict) {
    let count = verdict.triggering_obstacles.len();
    let status = if verdict.should_brake {
        "BRAKE".red().bold()
    } else {
        "clear".green()
    };
    match verdict.nearest() {
        Some(nearest) => println!(
            "{}  {} trigger sample(s), nearest {:.3} m at ({:.3}, {:.3}), time to hit {}",
            status,
            count,
            nearest.distance,
            nearest.x,
            nearest.y,
            format_time(nearest.time_to_hit),
        ),
        None => println!("{}  no trigger samples", status),
    }
}

fn format_time(seconds: f64) -> String {
    if seconds.is_finite() {
        format!("{seconds:.3} s")
    } else {
        "never".to_string()
    }
}
