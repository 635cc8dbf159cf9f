//! Random-walk property tests: a small hand-rolled generator random-walks
//! from the opening position for up to `D` plies, feeding every
//! intermediate state into pack/unpack and invariant checks. Uniform
//! legal-move selection is plain `choose(&mut rand::rng())` over the
//! current legal moves rather than an external property-testing crate.
#![cfg(test)]

use rand::prelude::*;

use crate::params::GameParams;
use crate::rules::Rules;
use crate::state::State;

const MAX_WALK_PLIES: usize = 60;

/// Random-walks from the opening position for up to `MAX_WALK_PLIES` plies,
/// stopping early at a terminal state, and returns every visited state
/// (opening included).
fn random_walk(rules: &Rules) -> Vec<State> {
    let mut rng = rand::rng();
    let mut state = rules.opening();
    let mut visited = vec![state.clone()];
    for _ in 0..MAX_WALK_PLIES {
        let legal = rules.legal_moves(&state);
        let Some(&pit) = legal.choose(&mut rng) else {
            break;
        };
        state = rules.apply(&state, pit);
        visited.push(state.clone());
    }
    visited
}

fn boards() -> Vec<GameParams> {
    vec![
        GameParams::new(1, 1),
        GameParams::new(2, 1),
        GameParams::new(3, 2),
        GameParams::new(4, 3),
        GameParams::new(6, 6),
    ]
}

#[test]
fn pack_unpack_round_trips_every_random_walk_state() {
    for params in boards() {
        let rules = Rules::new(params);
        for _ in 0..20 {
            for state in random_walk(&rules) {
                let bytes = rules.pack(&state);
                assert_eq!(
                    rules.unpack(&bytes),
                    state,
                    "unpack(pack(s)) must equal s on {params:?}"
                );
            }
        }
    }
}

#[test]
fn every_random_walk_state_conserves_total_seeds() {
    for params in boards() {
        let rules = Rules::new(params);
        let total = params.total_seeds() as i64;
        for _ in 0..20 {
            for state in random_walk(&rules) {
                let sum: i64 = state.cells().iter().map(|&c| c as i64).sum();
                assert_eq!(sum, total, "seed conservation violated on {params:?}");
            }
        }
    }
}

#[test]
fn every_legal_move_lands_inside_board_bounds() {
    for params in boards() {
        let rules = Rules::new(params);
        for _ in 0..20 {
            for state in random_walk(&rules) {
                for &pit in &rules.legal_moves(&state) {
                    assert!(pit < params.board_len(), "legal move {pit} out of bounds");
                    assert!(
                        params.is_own_pit(state.side(), pit),
                        "legal move {pit} is not one of the side-to-move's own pits"
                    );
                }
            }
        }
    }
}

#[test]
fn every_cell_value_stays_within_the_packed_field_range() {
    for params in boards() {
        let rules = Rules::new(params);
        let max_value = params.total_seeds() as u16;
        for _ in 0..20 {
            for state in random_walk(&rules) {
                for &cell in state.cells() {
                    assert!(
                        cell <= max_value,
                        "cell value {cell} exceeds 2ps={max_value} on {params:?}"
                    );
                }
            }
        }
    }
}
