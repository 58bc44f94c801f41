//! Feature extraction: the fixed-shape state representation the Q-table is
//! keyed on. Pure functions of board content and acting symbol.

use serde::{Deserialize, Serialize};

use crate::game::{Board, Cell, Symbol};

/// Assessed state of the board from one player's perspective. Structurally
/// comparable and hashable so it can key the Q-table directly; the field
/// order is the canonical tuple order for sorting persisted entries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FeatureVector {
    pub can_win_this_turn: bool,
    pub must_block_this_turn: bool,
    pub center_zone_available: u8,
    pub center_zone_owned: u8,
    pub corners_available: u8,
    pub edge_mids_available: u8,
    pub total_pieces_placed: u8,
}

/// Assess the board for `symbol`. Side-effect-free: identical board content
/// always yields an identical vector. Wildcard cells are ignored by every
/// zone tally and by the piece count.
pub fn assess(board: &Board, symbol: Symbol) -> FeatureVector {
    let variant = board.variant();
    FeatureVector {
        can_win_this_turn: board.completing_move(symbol).is_some(),
        must_block_this_turn: board.completing_move(symbol.other()).is_some(),
        center_zone_available: count_empty(board, variant.center_zone()),
        center_zone_owned: count_owned(board, variant.center_zone(), symbol),
        corners_available: count_empty(board, variant.corners()),
        edge_mids_available: count_empty(board, variant.edge_mids()),
        total_pieces_placed: board
            .cells()
            .iter()
            .filter(|cell| matches!(cell, Cell::Owned(_)))
            .count() as u8,
    }
}

fn count_empty(board: &Board, zone: &[usize]) -> u8 {
    zone.iter().filter(|&&pos| board.cell(pos) == Cell::Empty).count() as u8
}

fn count_owned(board: &Board, zone: &[usize], symbol: Symbol) -> u8 {
    zone.iter()
        .filter(|&&pos| board.cell(pos) == Cell::Owned(symbol))
        .count() as u8
}
