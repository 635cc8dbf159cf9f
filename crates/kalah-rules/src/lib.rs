//! Kalah(p,s) rules engine: board geometry, sowing/capture/terminal-sweep
//! semantics, Zobrist fingerprinting, and the packed on-disk encoding.
//!
//! Modeled on a CFR-style game trait shape (`root`/`turn`/`apply`/
//! `payoff`), adapted for a runtime-parametric board: rather than a
//! `Copy`-self-contained state, a [`Rules`] instance holds the immutable
//! `(GameParams, Zobrist)` pair and exposes state transitions as methods
//! taking a [`State`] by reference.

mod pack;
mod params;
#[cfg(test)]
mod property;
mod rules;
mod side;
mod state;
mod zobrist;

pub use pack::{pack, unpack};
pub use params::GameParams;
pub use rules::{KalahGame, Rules};
pub use side::Side;
pub use state::State;
pub use zobrist::Zobrist;
