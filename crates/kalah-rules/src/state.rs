use crate::side::Side;

/// A board position: seed counts for every pit and store, plus the side to
/// move. Positions with an empty legal-move list are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    cells: Vec<u16>,
    side: Side,
}

impl State {
    pub(crate) fn new(cells: Vec<u16>, side: Side) -> Self {
        Self { cells, side }
    }

    pub fn cells(&self) -> &[u16] {
        &self.cells
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Sum of all seeds still on the board, excluding both stores. Used by
    /// the retrograde driver to derive a position's seed level.
    pub fn seed_level(&self, params: &crate::GameParams) -> usize {
        let store_a = params.own_store(Side::A);
        let store_b = params.own_store(Side::B);
        self.cells
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != store_a && i != store_b)
            .map(|(_, &v)| v as usize)
            .sum()
    }
}
