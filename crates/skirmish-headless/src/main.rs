//! Headless fixed-tick driver.
//!
//! Runs the simulation in real time (or as fast as possible) with a handful
//! of autopilot players and logs round results. Useful for soak testing and
//! for eyeballing balance changes without a client.

mod bot;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use skirmish_core::geometry::Torus;
use skirmish_core::snapshot::ServerMessage;
use skirmish_core::{GameConfig, Millis, World};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::bot::Bot;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Simulation seed
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Number of autopilot players
    #[arg(short, long, default_value_t = 4)]
    bots: usize,

    /// Simulated seconds to run; 0 runs until interrupted
    #[arg(long, default_value_t = 0)]
    seconds: u64,

    /// Override the configured tick rate
    #[arg(short, long)]
    tick_rate: Option<u32>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not wait between ticks
    #[arg(long)]
    fast: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    dump: bool,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GameConfig::from_json_str(&json)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(rate) = args.tick_rate {
        config.arena.tick_rate_hz = rate;
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn report(messages: Vec<ServerMessage>) {
    for message in messages {
        match message {
            ServerMessage::RoundStarted { round_id, .. } => info!(round_id, "round started"),
            ServerMessage::RoundEnded { round_id, stats, .. } => {
                info!(round_id, players = stats.len(), "round over");
                for (rank, entry) in stats.iter().enumerate() {
                    info!(
                        rank = rank + 1,
                        name = %entry.name,
                        score = entry.score,
                        kills = entry.kills,
                        self_destructs = entry.self_destructs,
                        hit_percent = ?entry.hit_percent,
                        "standing"
                    );
                }
            }
            ServerMessage::RoundTime { time_left_ms } => debug!(time_left_ms, "round time"),
            ServerMessage::BlastPulse { .. } => {}
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        !(args.fast && args.seconds == 0),
        "--fast needs a --seconds limit"
    );
    let config = load_config(&args)?;
    let step: Millis = config.tick_interval_ms();
    let torus = Torus::from_config(&config.arena);
    let max_players = config.arena.max_players;

    let mut world = World::new(config, args.seed)?;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed ^ 0xb07);
    let mut bots = Vec::new();
    for i in 0..args.bots {
        match world.join(&format!("bot{i}")) {
            Ok(player) => bots.push(Bot::new(player)),
            Err(err) => {
                warn!(%err, max_players, "not all bots fit");
                break;
            }
        }
    }
    info!(seed = args.seed, bots = bots.len(), step, "simulation starting");

    let limit = (args.seconds > 0).then(|| args.seconds * 1000);
    let mut ticker = interval(Duration::from_millis(step));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut now: Millis = 0;

    loop {
        if limit.is_some_and(|limit| now > limit) {
            break;
        }
        if !args.fast {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
        }

        let snapshot = world.snapshot();
        for bot in &mut bots {
            let input = bot.think(&snapshot, &torus, &mut rng);
            world.set_input(bot.player(), input);
        }
        world.tick(now);
        report(world.drain_messages());
        now += step;
    }

    info!(ticks = world.ticks(), now, "simulation finished");
    if args.dump {
        let json = serde_json::to_string_pretty(&world.snapshot())?;
        println!("{json}");
    }
    Ok(())
}
