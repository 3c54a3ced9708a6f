//! Line-oriented console frontend.
//!
//! `ConsoleUi` answers the engine's dialogs from a reader and prints to a
//! writer; `ConsoleAnimator` narrates animations. End of input answers
//! every dialog as dismissed.

use std::io::{BufRead, Write};

use crate::protocol::parser::parse_yes_no;
use crate::session::{Animation, AnimationSequence, Animator, Interaction};
use crate::world::{Colony, Nation, WorldState};

pub struct ConsoleUi<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> ConsoleUi<R, W> {
    pub fn new(input: R, out: W) -> Self {
        ConsoleUi { input, out }
    }

    /// Writes a line; write failures are logged and otherwise ignored.
    pub fn say(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            log::warn!("console write failed: {}", e);
        }
    }

    fn prompt(&mut self, text: &str) {
        if let Err(e) = write!(self.out, "{} ", text).and_then(|_| self.out.flush()) {
            log::warn!("console write failed: {}", e);
        }
    }

    /// Reads one trimmed line, or `None` at end of input.
    pub fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                log::warn!("console read failed: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Interaction for ConsoleUi<R, W> {
    fn message(&mut self, text: &str) {
        self.say(&format!("> {}", text));
    }

    fn confirm(&mut self, question: &str) -> Option<bool> {
        loop {
            self.prompt(&format!("{} [y/n]", question));
            let line = self.read_line()?;
            if let Some(answer) = parse_yes_no(&line) {
                return Some(answer);
            }
        }
    }

    fn choose(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        self.say(prompt);
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}) {}", i + 1, option));
        }
        loop {
            self.prompt("choice (blank to cancel):");
            let line = self.read_line()?;
            if line.is_empty() {
                return None;
            }
            match line.parse::<usize>() {
                Ok(n) if n >= 1 && n <= options.len() => return Some(n - 1),
                _ => self.say("no such option"),
            }
        }
    }

    fn input_string(&mut self, prompt: &str, default: &str) -> Option<String> {
        self.prompt(&format!("{} [{}]:", prompt, default));
        let line = self.read_line()?;
        Some(if line.is_empty() { default.to_string() } else { line })
    }

    fn input_int(&mut self, prompt: &str, min: i32, max: i32) -> Option<i32> {
        loop {
            self.prompt(&format!("{} ({}-{}):", prompt, min, max));
            let line = self.read_line()?;
            if line.is_empty() {
                return None;
            }
            match line.parse::<i32>() {
                Ok(n) if (min..=max).contains(&n) => return Some(n),
                _ => self.say("out of range"),
            }
        }
    }

    fn show_colony(&mut self, colony: &Colony) {
        self.say(&format!("== {} ({}) at {} ==", colony.name, colony.nation, colony.coord));
        let buildings: Vec<&str> = colony.buildings.iter().map(|b| b.name()).collect();
        self.say(&format!("buildings: {}", if buildings.is_empty() { "none".to_string() } else { buildings.join(", ") }));
        let stock: Vec<String> = colony
            .stock
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| format!("{} {}", n, c.name()))
            .collect();
        self.say(&format!("stock: {}", if stock.is_empty() { "empty".to_string() } else { stock.join(", ") }));
        if let Some(b) = colony.construction {
            self.say(&format!("building {} ({}/{} hammers)", b.name(), colony.hammers, b.hammer_cost()));
        }
    }
}

/// Prints one line per animation step.
pub struct ConsoleAnimator<W> {
    out: W,
}

impl<W: Write> ConsoleAnimator<W> {
    pub fn new(out: W) -> Self {
        ConsoleAnimator { out }
    }
}

fn describe(step: &Animation) -> String {
    match step {
        Animation::Slide { unit, from, direction } => format!("{} moves {} from {}", unit, direction.abbr(), from),
        Animation::Attack {
            attacker,
            defender,
            attacker_wins,
        } => format!(
            "{} attacks {}: {}",
            attacker,
            defender,
            if *attacker_wins { "victory" } else { "defeat" }
        ),
        Animation::Depixelate { unit } => format!("{} fades away", unit),
        Animation::Fortify { unit } => format!("{} digs in", unit),
        Animation::ColonyCapture { colony } => format!("{} falls", colony),
    }
}

impl<W: Write> Animator for ConsoleAnimator<W> {
    fn play(&mut self, sequence: &AnimationSequence) {
        for step in &sequence.steps {
            if let Err(e) = writeln!(self.out, "* {}", describe(step)) {
                log::warn!("console write failed: {}", e);
                return;
            }
        }
    }
}

/// Draws the map as `nation` sees it. Unexplored squares are blank,
/// colonies are `@`, and visible units show their nation's letter.
pub fn render_map(world: &WorldState, nation: Nation) -> String {
    let layer = world.fog.layer(nation);
    let mut out = String::new();
    for y in 0..world.map.height() {
        for x in 0..world.map.width() {
            let c = crate::world::Coord::new(x, y);
            let explored = layer.is_some_and(|l| l.is_explored(&world.map, c));
            let visible = layer.is_some_and(|l| l.is_visible(&world.map, c));
            let glyph = if !explored {
                ' '
            } else if world.colony_at(c).is_some() {
                '@'
            } else if let Some(u) = world.units_at(c).first().filter(|_| visible) {
                world.units.get(u).map_or('?', |u| u.nation.glyph())
            } else {
                world.map.square(c).map_or(' ', |s| s.terrain.glyph())
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
