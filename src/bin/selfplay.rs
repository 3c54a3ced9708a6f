//! Headless self-play CLI.
//!
//! Plays AI-only games and writes one JSON summary per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --games 20 --turns 100 --output games.jsonl

use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use tidewater::config::EngineConfig;
use tidewater::selfplay::{self, SelfPlayConfig};

#[derive(Parser, Debug)]
#[command(name = "selfplay", about = "Play headless AI-only games")]
struct Args {
    #[arg(long, default_value_t = 10)]
    games: usize,

    /// Turn cycles per game.
    #[arg(long, default_value_t = 50)]
    turns: u32,

    #[arg(long, default_value_t = 4)]
    threads: usize,

    /// Base seed; 0 draws from entropy.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = 32)]
    width: i32,

    #[arg(long, default_value_t = 20)]
    height: i32,

    /// JSON engine configuration. Autosaving is always off.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file; stdout when omitted.
    #[arg(long)]
    output: Option<PathBuf>,

    #[arg(long)]
    quiet: bool,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut engine = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    engine.autosave_every = None;
    let config = SelfPlayConfig {
        num_games: args.games,
        turns: args.turns,
        threads: args.threads.max(1),
        seed: args.seed,
        width: args.width,
        height: args.height,
        quiet: args.quiet,
        engine,
    };

    if !config.quiet {
        eprintln!(
            "Self-play: {} games, {} turns, {}x{} map, {} threads",
            config.num_games, config.turns, config.width, config.height, config.threads
        );
    }
    let start = Instant::now();
    let games = selfplay::run_self_play(&config)?;
    if !config.quiet {
        let elapsed = start.elapsed().as_secs_f64();
        eprintln!("Completed {} games in {:.1}s", games.len(), elapsed);
        selfplay::print_summary(&games);
    }

    match &args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            selfplay::write_jsonl(&games, &mut writer)?;
            if !config.quiet {
                eprintln!("Wrote {} games to {}", games.len(), path.display());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            selfplay::write_jsonl(&games, &mut writer)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("selfplay: {}", e);
            ExitCode::FAILURE
        }
    }
}
