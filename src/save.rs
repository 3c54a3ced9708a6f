//! Saving and loading games.
//!
//! A save is a JSON snapshot of `WorldState`, which includes the turn cycle
//! and every nation's activation queue. The driver only regains control at
//! phase boundaries, so any snapshot it takes can be resumed.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::session::Autosave;
use crate::world::WorldState;

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed save: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SaveError + '_ {
    move |source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn to_json(world: &WorldState) -> Result<String, SaveError> {
    Ok(serde_json::to_string(world)?)
}

/// Parses a snapshot and rebuilds the derived indexes.
pub fn from_json(text: &str) -> Result<WorldState, SaveError> {
    let mut world: WorldState = serde_json::from_str(text)?;
    world.reindex();
    Ok(world)
}

pub fn save_world(world: &WorldState, path: &Path) -> Result<(), SaveError> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, world)?;
    out.flush().map_err(io_error(path))?;
    log::info!("saved game to {}", path.display());
    Ok(())
}

pub fn load_world(path: &Path) -> Result<WorldState, SaveError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut world: WorldState = serde_json::from_reader(BufReader::new(file))?;
    world.reindex();
    log::info!("loaded game from {} ({})", path.display(), world.turn.time);
    Ok(world)
}

/// Autosaves to a fixed file, overwriting the previous autosave.
#[derive(Debug, Clone)]
pub struct FileAutosave {
    pub path: PathBuf,
}

impl FileAutosave {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileAutosave { path: path.into() }
    }
}

impl Autosave for FileAutosave {
    fn autosave(&mut self, world: &WorldState) -> Result<(), SaveError> {
        save_world(world, &self.path)
    }
}
