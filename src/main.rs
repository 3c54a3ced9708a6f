//! Tidewater console game.
//!
//! One human nation plays through a line protocol on stdin/stdout; every
//! other nation is played by the random agent. Set `RUST_LOG` for engine
//! logs on stderr.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use tidewater::ai::RandomAgent;
use tidewater::config::{EngineConfig, OverdrawPrompt};
use tidewater::game::Game;
use tidewater::protocol::{parse_command, render_map, Command, ConsoleAnimator, ConsoleUi, HELP};
use tidewater::save::{load_world, FileAutosave};
use tidewater::scenario::{generate, ScenarioOptions};
use tidewater::turn::{Suspension, TurnInput};
use tidewater::world::{Nation, WorldState};

#[derive(Parser, Debug)]
#[command(name = "tidewater", about = "Play a colonial strategy game on the console")]
struct Args {
    /// JSON engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Resume a saved game instead of generating a new one.
    #[arg(long)]
    load: Option<PathBuf>,

    /// Nation to play in a new game.
    #[arg(long, default_value = "english")]
    nation: String,

    /// Scenario and dice seed; 0 draws from entropy.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 32)]
    width: i32,

    #[arg(long, default_value_t = 20)]
    height: i32,

    /// Autosave every N turns.
    #[arg(long)]
    autosave_every: Option<u32>,

    #[arg(long)]
    no_autosave: bool,

    /// Never ask before moves that may fail for lack of movement points.
    #[arg(long)]
    no_overdraw_prompt: bool,
}

fn load_config(args: &Args) -> Result<EngineConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(n) = args.autosave_every {
        config.autosave_every = Some(n);
    }
    if args.no_autosave {
        config.autosave_every = None;
    }
    if args.no_overdraw_prompt {
        config.overdraw_prompt = OverdrawPrompt::Never;
    }
    config.validate()?;
    Ok(config)
}

fn status(world: &WorldState, suspension: Suspension) -> String {
    match suspension {
        Suspension::NeedsOrders { nation, unit } => match world.unit(unit) {
            Ok(u) => {
                let place = world
                    .unit_coord(unit)
                    .map_or_else(|| "at sea".to_string(), |c| format!("at {}", c));
                format!(
                    "[{} {}] {} {} {}, {} moves left",
                    nation, world.turn.time, u.name(), unit, place, u.mv_pts
                )
            }
            Err(_) => format!("[{}] {} is waiting", nation, unit),
        },
        Suspension::EndOfTurn { nation } => {
            format!("[{} {}] no units left to move; 'next' ends the turn", nation, world.turn.time)
        }
        Suspension::CycleFinished => format!("-- {} --", world.turn.time),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = load_config(&args)?;
    let world = match &args.load {
        Some(path) => load_world(path)?,
        None => {
            let nation = Nation::from_name(&args.nation).ok_or_else(|| format!("unknown nation '{}'", args.nation))?;
            let options = ScenarioOptions {
                width: args.width,
                height: args.height,
                seed: args.seed,
                humans: vec![nation],
            };
            generate(&options, &config)?
        }
    };

    let saver = FileAutosave::new(config.autosave_path.clone());
    let mut game = Game::new(world, config, args.seed, Box::new(saver));
    let mut agent = RandomAgent::new();
    let stdin = io::stdin();
    let mut ui = ConsoleUi::new(stdin.lock(), io::stdout());
    let mut animator = ConsoleAnimator::new(io::stdout());
    ui.say("tidewater: type 'help' for commands");

    let mut input = None;
    loop {
        let suspension = game.step(&mut ui, &mut animator, input.take())?;
        if let Some(answer) = game.answer_ai(&mut agent, suspension) {
            input = Some(answer);
            continue;
        }
        ui.say(&status(&game.world, suspension));
        if suspension == Suspension::CycleFinished {
            continue;
        }
        match read_command(&mut ui, &mut game, suspension)? {
            Some(answer) => input = Some(answer),
            None => return Ok(()),
        }
    }
}

/// Reads commands until one answers `suspension`. Returns `None` on quit
/// or end of input.
fn read_command<R: BufRead, W: Write>(
    ui: &mut ConsoleUi<R, W>,
    game: &mut Game,
    suspension: Suspension,
) -> Result<Option<TurnInput>, Box<dyn Error>> {
    loop {
        let Some(line) = ui.read_line() else {
            return Ok(None);
        };
        let command = match parse_command(&line) {
            Ok(Some(c)) => c,
            Ok(None) => continue,
            Err(e) => {
                ui.say(&e.to_string());
                continue;
            }
        };
        match command {
            Command::Quit => return Ok(None),
            Command::Help => ui.say(HELP),
            Command::Map => {
                if let Some(nation) = Game::waiting_on(suspension) {
                    ui.say(&render_map(&game.world, nation));
                }
            }
            Command::Save(path) => match game.save(&path) {
                Ok(()) => ui.say(&format!("saved to {}", path.display())),
                Err(e) => ui.say(&e.to_string()),
            },
            other => match other.to_input(suspension) {
                Some(input) => return Ok(Some(input)),
                None => ui.say("that does not apply right now"),
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("tidewater: {}", e);
            ExitCode::FAILURE
        }
    }
}
