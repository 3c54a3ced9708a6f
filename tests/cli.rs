//! Smoke tests for the two binaries.
//!
//! Spawns each binary, feeds it input on stdin, and checks what it prints.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Runs the console game with `args`, sends `commands`, and collects stdout
/// lines.
fn run_console(args: &[&str], commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_tidewater");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start tidewater");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

#[test]
fn console_starts_with_first_english_unit() {
    let lines = run_console(&["--no-autosave", "--seed", "3"], &["quit"]);
    assert!(lines.iter().any(|l| l.contains("type 'help'")));
    assert!(lines.iter().any(|l| l.starts_with("[English 1492] Caravel #1")));
}

#[test]
fn help_and_bad_commands() {
    let lines = run_console(&["--no-autosave"], &["help", "fly away", "move up", "quit"]);
    assert!(lines.iter().any(|l| l == "commands:"));
    assert!(lines.iter().any(|l| l.contains("unknown command: fly")));
    assert!(lines.iter().any(|l| l.contains("not a direction: 'up'")));
}

#[test]
fn map_shows_the_landing() {
    let lines = run_console(&["--no-autosave", "--width", "16", "--height", "12"], &["map", "quit"]);
    // The English land on the east coast of the first band.
    assert!(lines.iter().any(|l| !l.starts_with('[') && l.contains('E')));
}

#[test]
fn end_of_input_exits_cleanly() {
    let lines = run_console(&["--no-autosave"], &[]);
    assert!(!lines.is_empty());
}

#[test]
fn selfplay_writes_one_line_per_game() {
    let exe = env!("CARGO_BIN_EXE_selfplay");
    let output = Command::new(exe)
        .args(["--games", "2", "--turns", "3", "--threads", "1", "--seed", "5", "--quiet"])
        .output()
        .expect("failed to run selfplay");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let game: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(game["summary"]["turns_played"], 3);
    }
}
