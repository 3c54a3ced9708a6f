//! Tidewater: turn processing and order resolution for a colonial strategy
//! game.
//!
//! Exposes the world store, the order resolvers, the turn engine and the
//! drivers used by the console and self-play binaries.

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod protocol;
pub mod resolve;
pub mod save;
pub mod scenario;
pub mod selfplay;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod turn;
pub mod world;
