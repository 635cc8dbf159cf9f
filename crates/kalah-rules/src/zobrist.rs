use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::params::GameParams;
use crate::state::State;
use kalah_core::Fingerprint;

const ZOBRIST_SEED: u64 = 0x4B_41_4C_41_48_5F_30_31; // "KALAH_01" as bytes

/// 64-bit Zobrist table for a fixed `GameParams`, built from a
/// deterministically-seeded RNG (not `thread_rng`) so two solver processes
/// for the same `(p,s)` board always agree on fingerprints.
pub struct Zobrist {
    // table[cell][value] -> random key, value ranges 0..=total_seeds
    table: Vec<Vec<u64>>,
    side_key: [u64; 2],
}

impl Zobrist {
    pub fn new(params: &GameParams) -> Self {
        let mut rng = SmallRng::seed_from_u64(ZOBRIST_SEED);
        let table = (0..params.board_len())
            .map(|_| {
                (0..=params.total_seeds())
                    .map(|_| rng.random::<u64>())
                    .collect()
            })
            .collect();
        let side_key = [rng.random::<u64>(), rng.random::<u64>()];
        Self { table, side_key }
    }

    pub fn fingerprint(&self, state: &State) -> Fingerprint {
        let mut acc = self.side_key[state.side().bit() as usize];
        for (cell, &value) in state.cells().iter().enumerate() {
            acc ^= self.table[cell][value as usize];
        }
        acc as i64
    }
}

impl std::fmt::Debug for Zobrist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zobrist")
            .field("cells", &self.table.len())
            .finish()
    }
}
