//! Console protocol: the command grammar and a stdin/stdout frontend.

pub mod console;
pub mod parser;

pub use console::{render_map, ConsoleAnimator, ConsoleUi};
pub use parser::{parse_command, parse_yes_no, Command, ParseError, HELP};
