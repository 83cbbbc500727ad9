//! # Brawl Sim
//!
//! Headless match driver for the Brawl combat core.
//!
//! Runs a fixed-tick 1v1 between a scripted fighter and an AI fighter and
//! logs every resolved hit. Useful for balance passes: edit the combat table,
//! rerun with the same seed, compare.
//!
//! ```text
//! brawl-sim [--config PATH] [--seed N] [--ticks N] [--difficulty NAME]
//!           [--personality NAME] [--json]
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod arena;

use anyhow::{Context, Result};
use brawl_combat::{CombatConfig, Difficulty, Personality};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::arena::{Arena, SimOptions};

/// Headless Brawl match runner
#[derive(Parser, Debug)]
#[command(name = "brawl-sim", version)]
#[command(about = "Run a scripted fighter against the tactical AI and report the match")]
struct Args {
    /// Combat table (TOML or RON); defaults are used when missing
    #[arg(long, default_value = "brawl.toml")]
    config: PathBuf,

    /// Seed for the AI's decision noise
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum ticks before the match times out
    #[arg(long)]
    ticks: Option<u64>,

    /// CPU skill level
    #[arg(long, value_enum, default_value_t = DifficultyArg::Hard)]
    difficulty: DifficultyArg,

    /// CPU temperament
    #[arg(long, value_enum, default_value_t = PersonalityArg::Balanced)]
    personality: PersonalityArg,

    /// Print the match summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn sim_options(&self) -> SimOptions {
        let defaults = SimOptions::default();
        SimOptions {
            seed: self.seed.unwrap_or(defaults.seed),
            max_ticks: self.ticks.unwrap_or(defaults.max_ticks),
            difficulty: self.difficulty.into(),
            personality: self.personality.into(),
            ..defaults
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
    Expert,
    Legendary,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
            DifficultyArg::Expert => Self::Expert,
            DifficultyArg::Legendary => Self::Legendary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PersonalityArg {
    Aggressive,
    Balanced,
    Defensive,
}

impl From<PersonalityArg> for Personality {
    fn from(arg: PersonalityArg) -> Self {
        match arg {
            PersonalityArg::Aggressive => Self::Aggressive,
            PersonalityArg::Balanced => Self::Balanced,
            PersonalityArg::Defensive => Self::Defensive,
        }
    }
}

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("brawl=info".parse()?))
        .init();

    let args = Args::parse();
    info!("Brawl sim {}", env!("CARGO_PKG_VERSION"));

    let config = CombatConfig::load_or_default(&args.config);
    config
        .validate()
        .with_context(|| format!("invalid combat table in {}", args.config.display()))?;

    let options = args.sim_options();
    info!(
        seed = options.seed,
        ticks = options.max_ticks,
        difficulty = ?options.difficulty,
        personality = ?options.personality,
        "starting match"
    );
    let summary = Arena::new(config, options).run();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!(
            ticks = summary.ticks,
            hits = summary.hits,
            parries = summary.parries,
            counters = summary.counters,
            winner = ?summary.winner,
            "match over"
        );
    }
    Ok(())
}
