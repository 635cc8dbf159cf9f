use kalah_core::{SolveError, SolveResult};

use crate::pack;
use crate::params::GameParams;
use crate::side::Side;
use crate::state::State;
use crate::zobrist::Zobrist;

/// The operation set a CFR-style game trait exposes (`root`, `turn`,
/// `apply`, `payoff`), adapted to a board whose size is a runtime parameter
/// rather than baked into the type. A `Copy`, self-contained state (as RPS's
/// single `u8` is) isn't viable here, so the trait is implemented against a
/// `(&GameParams, &State)` pair instead of `State` alone.
pub trait KalahGame {
    fn root(&self) -> State;
    fn turn(&self, state: &State) -> Side;
    fn legal_moves(&self, state: &State) -> Vec<usize>;
    fn apply(&self, state: &State, pit: usize) -> State;
    fn payoff(&self, state: &State) -> i32;
}

/// The rules engine: board geometry plus the Zobrist table derived from it.
/// Implements sowing, capture, the extra-turn rule, and the terminal sweep
/// exactly as a single `apply` step.
pub struct Rules {
    params: GameParams,
    zobrist: Zobrist,
}

impl Rules {
    pub fn new(params: GameParams) -> Self {
        let zobrist = Zobrist::new(&params);
        Self { params, zobrist }
    }

    pub fn params(&self) -> &GameParams {
        &self.params
    }

    pub fn opening(&self) -> State {
        let mut cells = vec![0u16; self.params.board_len()];
        for i in self.params.pit_range(Side::A) {
            cells[i] = self.params.seeds() as u16;
        }
        for i in self.params.pit_range(Side::B) {
            cells[i] = self.params.seeds() as u16;
        }
        State::new(cells, Side::A)
    }

    pub fn fingerprint(&self, state: &State) -> kalah_core::Fingerprint {
        self.zobrist.fingerprint(state)
    }

    pub fn pack(&self, state: &State) -> Vec<u8> {
        pack::pack(&self.params, state)
    }

    pub fn unpack(&self, bytes: &[u8]) -> State {
        pack::unpack(&self.params, bytes)
    }

    /// Pit indices on the side to move that currently hold at least one
    /// seed. An empty result means `state` is terminal.
    pub fn legal_moves(&self, state: &State) -> Vec<usize> {
        self.params
            .pit_range(state.side())
            .filter(|&i| state.cells()[i] > 0)
            .collect()
    }

    pub fn is_terminal(&self, state: &State) -> bool {
        self.legal_moves(state).is_empty()
    }

    /// Applies a single sowing move: distributes the seeds from `pit`
    /// skipping the opponent's store, then resolves the extra-turn rule,
    /// the capture rule, and — if the move emptied one side entirely — the
    /// terminal sweep, in that order.
    pub fn apply(&self, state: &State, pit: usize) -> State {
        debug_assert!(
            state.cells()[pit] > 0,
            "apply called on an empty pit {pit}"
        );

        let side = state.side();
        let board_len = self.params.board_len();
        let opponent_store = self.params.opponent_store(side);
        let own_store = self.params.own_store(side);

        let mut cells = state.cells().to_vec();
        let mut remaining = cells[pit];
        cells[pit] = 0;

        let mut idx = pit;
        let mut last = pit;
        while remaining > 0 {
            idx = (idx + 1) % board_len;
            if idx == opponent_store {
                continue;
            }
            cells[idx] += 1;
            remaining -= 1;
            last = idx;
        }

        let next_side = if last == own_store {
            // Extra-turn rule: landing in your own store keeps the move.
            side
        } else if self.params.is_own_pit(side, last) && cells[last] == 1 {
            // Capture rule: the final seed landed in a pit of your own that
            // was empty before this move. If the directly-opposite pit is
            // non-empty, both pits empty into your store.
            let opposite = self.params.opposite_pit(last);
            if cells[opposite] > 0 {
                let captured = cells[opposite] + cells[last];
                cells[own_store] += captured;
                cells[opposite] = 0;
                cells[last] = 0;
            }
            side.other()
        } else {
            side.other()
        };

        let mut next = State::new(cells, next_side);
        self.sweep_if_terminal(&mut next);
        next
    }

    pub fn try_apply(&self, state: &State, pit: usize) -> SolveResult<State> {
        if pit >= self.params.board_len() || state.cells()[pit] == 0 {
            return Err(SolveError::Precondition(format!(
                "cannot sow from pit {pit}: empty or out of range"
            )));
        }
        if !self.params.is_own_pit(state.side(), pit) {
            return Err(SolveError::Precondition(format!(
                "pit {pit} does not belong to the side to move"
            )));
        }
        Ok(self.apply(state, pit))
    }

    /// If either side's pits are all empty, sweeps the other side's
    /// remaining seeds into its own store. Terminal states therefore always
    /// have every pit empty and a seed level of zero.
    fn sweep_if_terminal(&self, state: &mut State) {
        let a_empty = self
            .params
            .pit_range(Side::A)
            .all(|i| state.cells()[i] == 0);
        let b_empty = self
            .params
            .pit_range(Side::B)
            .all(|i| state.cells()[i] == 0);

        if a_empty {
            self.sweep_into(state, Side::B);
        } else if b_empty {
            self.sweep_into(state, Side::A);
        }
    }

    fn sweep_into(&self, state: &mut State, side: Side) {
        let store = self.params.own_store(side);
        let range = self.params.pit_range(side);
        let cells = state.cells().to_vec();
        let sum: u32 = range.clone().map(|i| cells[i] as u32).sum();
        let mut new_cells = cells;
        new_cells[store] += sum as u16;
        for i in range {
            new_cells[i] = 0;
        }
        *state = State::new(new_cells, state.side());
    }

    /// A's store minus B's store. Only meaningful for a terminal state.
    pub fn payoff(&self, state: &State) -> i32 {
        debug_assert!(self.is_terminal(state), "payoff read from a live position");
        let a = state.cells()[self.params.own_store(Side::A)] as i32;
        let b = state.cells()[self.params.own_store(Side::B)] as i32;
        a - b
    }
}

impl KalahGame for Rules {
    fn root(&self) -> State {
        self.opening()
    }

    fn turn(&self, state: &State) -> Side {
        state.side()
    }

    fn legal_moves(&self, state: &State) -> Vec<usize> {
        Rules::legal_moves(self, state)
    }

    fn apply(&self, state: &State, pit: usize) -> State {
        Rules::apply(self, state, pit)
    }

    fn payoff(&self, state: &State) -> i32 {
        Rules::payoff(self, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kalah_1_1_opening_score_is_zero() {
        let rules = Rules::new(GameParams::new(1, 1));
        let opening = rules.opening();
        assert_eq!(rules.legal_moves(&opening), vec![0]);

        let after = rules.apply(&opening, 0);
        assert!(rules.is_terminal(&after), "A's extra-turn pit is empty");
        assert_eq!(rules.payoff(&after), 0);
    }

    #[test]
    fn pack_unpack_round_trips_through_a_full_game() {
        let rules = Rules::new(GameParams::new(4, 3));
        let mut state = rules.opening();
        let mut rounds = 0;
        while !rules.is_terminal(&state) && rounds < 200 {
            let bytes = rules.pack(&state);
            let restored = rules.unpack(&bytes);
            assert_eq!(restored, state, "unpack(pack(s)) must equal s");

            let pit = *rules.legal_moves(&state).first().unwrap();
            state = rules.apply(&state, pit);
            rounds += 1;
        }
        assert!(rules.is_terminal(&state), "game must reach a terminal state");
    }

    #[test]
    fn terminal_states_conserve_total_seeds() {
        let params = GameParams::new(3, 2);
        let rules = Rules::new(params);
        let mut state = rules.opening();
        let total = params.total_seeds() as i64;
        while !rules.is_terminal(&state) {
            let pit = *rules.legal_moves(&state).first().unwrap();
            state = rules.apply(&state, pit);
        }
        let sum: i64 = state.cells().iter().map(|&c| c as i64).sum();
        assert_eq!(sum, total);
        assert!(state.seed_level(&params) == 0, "terminal states sweep every pit");
    }

    #[test]
    fn capture_empties_both_pits_into_the_store() {
        let params = GameParams::new(3, 1);
        let rules = Rules::new(params);
        // A: pit0=1, pit1=0 (empty, about to receive the last sown seed),
        // pit2=1; B: pit4=2, pit5=4 (opposite pit1), pit6=3.
        let state = State::new(vec![1, 0, 1, 0, 2, 4, 3, 0], Side::A);

        let after = rules.apply(&state, 0);
        let store_a = params.own_store(Side::A);
        assert_eq!(after.cells()[store_a], 5, "captures pit1 (1) plus its opposite (4)");
        assert_eq!(after.side(), Side::B, "capture ends the turn");
    }

    #[test]
    fn no_capture_when_opposite_pit_is_empty() {
        let params = GameParams::new(3, 1);
        let rules = Rules::new(params);
        let state = State::new(vec![1, 0, 1, 0, 2, 0, 3, 0], Side::A);

        let after = rules.apply(&state, 0);
        let store_a = params.own_store(Side::A);
        assert_eq!(after.cells()[store_a], 0, "nothing to capture from an empty opposite pit");
        assert_eq!(after.cells()[1], 1, "the landed seed simply stays in the pit");
    }

    #[test]
    fn bits_per_cell_covers_the_largest_board_in_a_single_store() {
        let params = GameParams::new(6, 6);
        assert_eq!(params.total_seeds(), 72);
        assert!(params.bits_per_cell() >= 7);
    }
}
