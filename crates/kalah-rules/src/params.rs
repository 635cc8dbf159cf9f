use crate::side::Side;

/// Board geometry for Kalah(p,s): `p` pits per side, `s` seeds per pit at
/// the opening position. All index arithmetic in the crate is derived from
/// these two numbers so the engine is never hardcoded to a specific board.
///
/// Layout, indices `0..=2p+1`:
/// - `0..p`       A's pits
/// - `p`          A's store
/// - `p+1..=2p`   B's pits
/// - `2p+1`       B's store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameParams {
    pits: u8,
    seeds: u8,
}

impl GameParams {
    pub fn new(pits: u8, seeds: u8) -> Self {
        assert!(pits >= 1, "Kalah requires at least one pit per side");
        Self { pits, seeds }
    }

    pub fn pits(&self) -> usize {
        self.pits as usize
    }

    pub fn seeds(&self) -> usize {
        self.seeds as usize
    }

    /// Total cells on the board, including both stores.
    pub fn board_len(&self) -> usize {
        2 * self.pits() + 2
    }

    /// Total seeds in play: `2ps`. The maximum a single cell (a store) can
    /// ever hold.
    pub fn total_seeds(&self) -> usize {
        2 * self.pits() * self.seeds()
    }

    /// Bits needed to represent any single cell's seed count, computed as
    /// `ceil(log2(2ps + 1))` rather than a fixed width: a store can hold up
    /// to `2ps` seeds, which exceeds 5 bits for boards as small as
    /// Kalah(6,6) (`2ps = 72`, needs 7 bits). Computing this per-board keeps
    /// `unpack(pack(s)) == s` for every supported `(p,s)`.
    pub fn bits_per_cell(&self) -> u32 {
        let max_value = self.total_seeds() as u64;
        (u64::BITS - max_value.leading_zeros()).max(1)
    }

    pub fn own_store(&self, side: Side) -> usize {
        match side {
            Side::A => self.pits(),
            Side::B => 2 * self.pits() + 1,
        }
    }

    pub fn opponent_store(&self, side: Side) -> usize {
        self.own_store(side.other())
    }

    pub fn pit_range(&self, side: Side) -> std::ops::Range<usize> {
        match side {
            Side::A => 0..self.pits(),
            Side::B => (self.pits() + 1)..(2 * self.pits() + 1),
        }
    }

    pub fn is_own_pit(&self, side: Side, index: usize) -> bool {
        self.pit_range(side).contains(&index)
    }

    /// The pit directly across the board from `index`, valid for any pit
    /// index (not a store). Symmetric: `opposite_pit(opposite_pit(i)) == i`.
    pub fn opposite_pit(&self, index: usize) -> usize {
        2 * self.pits() - index
    }
}
