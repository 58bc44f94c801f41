//! Action catalog: the small set of named move kinds the learning policy
//! chooses between. Each kind resolves to a concrete board position, or to
//! nothing when the current board does not support it.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Board, Symbol};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    WinNow,
    BlockOpponent,
    TakeCenter,
    TakeEdgeMid,
    TakeCorner,
    TakeRandom,
}

impl Action {
    /// Every action kind, in catalog order. `valid_actions` preserves this
    /// order.
    pub const ALL: [Action; 6] = [
        Action::WinNow,
        Action::BlockOpponent,
        Action::TakeCenter,
        Action::TakeEdgeMid,
        Action::TakeCorner,
        Action::TakeRandom,
    ];

    /// Get action name for display and reports
    pub fn name(self) -> &'static str {
        match self {
            Action::WinNow => "win_now",
            Action::BlockOpponent => "block_opponent",
            Action::TakeCenter => "take_center",
            Action::TakeEdgeMid => "take_edge_mid",
            Action::TakeCorner => "take_corner",
            Action::TakeRandom => "take_random",
        }
    }
}

/// Resolve an action kind to a board position. `None` means the action is
/// not available on this board (zone full, no completable line, ...).
/// Zone and random picks are uniform over the empty candidates.
pub fn resolve(
    action: Action,
    board: &Board,
    symbol: Symbol,
    rng: &mut StdRng,
) -> Option<usize> {
    match action {
        Action::WinNow => board.completing_move(symbol),
        Action::BlockOpponent => board.completing_move(symbol.other()),
        Action::TakeCenter => pick_empty(board, board.variant().center_zone(), rng),
        Action::TakeEdgeMid => pick_empty(board, board.variant().edge_mids(), rng),
        Action::TakeCorner => pick_empty(board, board.variant().corners(), rng),
        Action::TakeRandom => {
            let available = board.available_positions();
            if available.is_empty() {
                None
            } else {
                Some(available[rng.random_range(0..available.len())])
            }
        }
    }
}

/// Whether `resolve` would yield a position, without consuming randomness.
pub fn is_available(action: Action, board: &Board, symbol: Symbol) -> bool {
    match action {
        Action::WinNow => board.completing_move(symbol).is_some(),
        Action::BlockOpponent => board.completing_move(symbol.other()).is_some(),
        Action::TakeCenter => has_empty(board, board.variant().center_zone()),
        Action::TakeEdgeMid => has_empty(board, board.variant().edge_mids()),
        Action::TakeCorner => has_empty(board, board.variant().corners()),
        Action::TakeRandom => !board.is_full(),
    }
}

/// The ordered list of action kinds available to `symbol` right now.
/// Recomputed every turn; empty only when the board is full.
pub fn valid_actions(board: &Board, symbol: Symbol) -> Vec<Action> {
    Action::ALL
        .iter()
        .copied()
        .filter(|&action| is_available(action, board, symbol))
        .collect()
}

fn pick_empty(board: &Board, zone: &[usize], rng: &mut StdRng) -> Option<usize> {
    let available: Vec<usize> = zone
        .iter()
        .copied()
        .filter(|&pos| board.is_valid_move(pos))
        .collect();
    if available.is_empty() {
        None
    } else {
        Some(available[rng.random_range(0..available.len())])
    }
}

fn has_empty(board: &Board, zone: &[usize]) -> bool {
    zone.iter().any(|&pos| board.is_valid_move(pos))
}
