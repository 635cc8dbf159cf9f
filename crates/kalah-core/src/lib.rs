//! Shared types, errors, configuration, and progress/cancellation primitives
//! used across the Kalah solver workspace (`kalah-rules`, `kalah-store`,
//! `kalah-engine`, `kalah-cli`).

mod config;
mod error;
mod progress;
mod signal;
mod types;

pub use config::SolverConfig;
pub use error::{SolveError, SolveResult};
pub use progress::{Metrics, Progress};
pub use signal::Cancellation;
pub use types::{Fingerprint, Score};
