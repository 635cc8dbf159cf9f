use kalah_core::{Fingerprint, Score};

/// A single stored position: its identity (fingerprint, packed cells), its
/// place in the BFS frontier (depth, seed level), and — once the
/// retrograde driver reaches it — its perfect-play score and best move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    pub fingerprint: Fingerprint,
    pub packed_cells: Vec<u8>,
    pub depth: i16,
    pub seed_level: i16,
    pub score: Option<Score>,
    pub best_move: Option<i16>,
}

impl PositionRecord {
    pub fn unsolved(&self) -> bool {
        self.score.is_none()
    }
}
