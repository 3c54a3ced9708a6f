//! Headless AI-only games.
//!
//! Plays independent games with every nation driven by the random agent
//! and records a summary of each. Games run concurrently on a rayon pool;
//! each owns its world, so nothing is shared between them.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use serde::Serialize;

use crate::ai::RandomAgent;
use crate::config::EngineConfig;
use crate::game::{Game, GameSummary};
use crate::scenario::{generate, ScenarioOptions};
use crate::session::Silent;

#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    pub num_games: usize,
    /// Turn cycles per game.
    pub turns: u32,
    /// Worker threads; 1 plays games one after another.
    pub threads: usize,
    /// Base seed; game `i` uses `seed + i`. 0 draws each game's seed from
    /// entropy.
    pub seed: u64,
    pub width: i32,
    pub height: i32,
    /// Suppress per-game progress output.
    pub quiet: bool,
    pub engine: EngineConfig,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            turns: 50,
            threads: 4,
            seed: 0,
            width: 32,
            height: 20,
            quiet: false,
            engine: EngineConfig {
                autosave_every: None,
                ..EngineConfig::default()
            },
        }
    }
}

/// One finished (or failed) game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub elapsed_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<GameSummary>,
    /// Set when the engine stopped with an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn game_seed(config: &SelfPlayConfig, game_id: usize) -> u64 {
    if config.seed != 0 {
        config.seed.wrapping_add(game_id as u64)
    } else {
        // Never 0, which would mean entropy again inside the game.
        rand::random::<u64>() | 1
    }
}

/// Plays one game to completion.
pub fn play_game(config: &SelfPlayConfig, game_id: usize) -> GameRecord {
    let seed = game_seed(config, game_id);
    let start = Instant::now();
    let options = ScenarioOptions {
        width: config.width,
        height: config.height,
        seed,
        humans: Vec::new(),
    };
    let result = generate(&options, &config.engine)
        .map_err(|e| e.to_string())
        .and_then(|world| {
            let mut game = Game::new(world, config.engine.clone(), seed, Box::new(Silent));
            game.run_headless(&mut RandomAgent::new(), config.turns)
                .map_err(|e| e.to_string())
        });
    let (summary, error) = match result {
        Ok(summary) => (Some(summary), None),
        Err(e) => {
            log::error!("game {} (seed {}) failed: {}", game_id, seed, e);
            (None, Some(e))
        }
    };
    GameRecord {
        game_id,
        seed,
        elapsed_ms: start.elapsed().as_millis(),
        summary,
        error,
    }
}

fn report(config: &SelfPlayConfig, n: usize, game: &GameRecord) {
    if config.quiet {
        return;
    }
    let outcome = match (&game.summary, &game.error) {
        (Some(s), _) => format!("reached {}", s.time),
        (None, Some(e)) => format!("failed: {}", e),
        (None, None) => "no result".to_string(),
    };
    eprintln!(
        "Game {}/{}: {} ({:.1}s)",
        n,
        config.num_games,
        outcome,
        game.elapsed_ms as f64 / 1000.0
    );
}

/// Plays all games and returns them in completion order.
pub fn run_self_play(config: &SelfPlayConfig) -> Result<Vec<GameRecord>, rayon::ThreadPoolBuildError> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, |game| games.push(game))?;
    Ok(games)
}

/// Plays all games, handing each to `on_game` as soon as it finishes.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, on_game: F) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_parallel(config, on_game)
    } else {
        run_sequential(config, on_game);
        Ok(())
    }
}

fn run_sequential<F>(config: &SelfPlayConfig, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let game = play_game(config, i);
        report(config, i + 1, &game);
        on_game(game);
    }
}

fn run_parallel<F>(config: &SelfPlayConfig, mut on_game: F) -> Result<(), rayon::ThreadPoolBuildError>
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;
    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    let config_clone = config.clone();
    let handle = std::thread::spawn(move || {
        pool.install(|| {
            (0..config_clone.num_games)
                .into_par_iter()
                .for_each_with(tx, |tx, i| {
                    let game = play_game(&config_clone, i);
                    let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    report(&config_clone, n, &game);
                    let _ = tx.send(game);
                });
        });
    });

    for game in rx {
        on_game(game);
    }
    if let Err(panic) = handle.join() {
        std::panic::resume_unwind(panic);
    }
    Ok(())
}

/// Writes one JSON object per game per line.
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

pub fn print_summary(games: &[GameRecord]) {
    let failed = games.iter().filter(|g| g.error.is_some()).count();
    let finished: Vec<&GameSummary> = games.iter().filter_map(|g| g.summary.as_ref()).collect();
    eprintln!("=== Self-Play Summary ===");
    eprintln!("Games: {} ({} failed)", games.len(), failed);
    if finished.is_empty() {
        return;
    }
    let colonies: usize = finished.iter().flat_map(|s| &s.nations).map(|n| n.colonies).sum();
    let fathers: usize = finished.iter().flat_map(|s| &s.nations).map(|n| n.fathers).sum();
    let survivors: usize = finished.iter().flat_map(|s| &s.nations).filter(|n| n.alive).count();
    let per_game = |total: usize| total as f64 / finished.len() as f64;
    eprintln!("Colonies per game: {:.1}", per_game(colonies));
    eprintln!("Founding fathers per game: {:.1}", per_game(fathers));
    eprintln!("Surviving nations per game: {:.1}", per_game(survivors));
}
