use std::fmt;

use rand::rngs::StdRng;

use crate::ai::Agent;
use crate::error::TrainingError;
use crate::game::{Board, Symbol, Variant};

/// Final result of one episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Symbol),
    Draw,
}

/// Terminal reward from one player's perspective: win +1, loss -1, draw 0.
pub fn reward_for(symbol: Symbol, outcome: Outcome) -> f64 {
    match outcome {
        Outcome::Winner(winner) if winner == symbol => 1.0,
        Outcome::Winner(_) => -1.0,
        Outcome::Draw => 0.0,
    }
}

/// One game from empty board to terminal outcome. Owns the board and the two
/// players, alternates turns, and wires terminal rewards to both players:
/// the mover and the idle opponent who set up the position one move earlier.
pub struct Episode {
    board: Board,
    players: [Box<dyn Agent>; 2],
    current: usize,
    outcome: Option<Outcome>,
}

impl fmt::Debug for Episode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Episode")
            .field("board", &self.board)
            .field("players", &[self.players[0].name(), self.players[1].name()])
            .field("current", &self.current)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl Episode {
    /// Start a new episode. `players[0]` places X and moves first,
    /// `players[1]` places O. Wildcards are assigned here, once.
    pub fn new(
        players: [Box<dyn Agent>; 2],
        variant: Variant,
        wildcard_count: usize,
        rng: &mut StdRng,
    ) -> Result<Self, TrainingError> {
        if players[0].symbol() != Symbol::X || players[1].symbol() != Symbol::O {
            return Err(TrainingError::PlayerSymbols);
        }
        if wildcard_count >= variant.cell_count() {
            return Err(TrainingError::WildcardOverflow {
                requested: wildcard_count,
                capacity: variant.cell_count(),
            });
        }

        let mut board = Board::new(variant);
        board.assign_wildcards(wildcard_count, rng);

        let mut players = players;
        for player in players.iter_mut() {
            player.begin_episode();
        }

        Ok(Episode {
            board,
            players,
            current: 0,
            outcome: None,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Run the turn loop to completion and return the outcome.
    pub fn run(&mut self, rng: &mut StdRng) -> Result<Outcome, TrainingError> {
        if self.outcome.is_some() {
            return Err(TrainingError::Finished);
        }
        loop {
            if let Some(outcome) = self.play_turn(rng)? {
                return Ok(outcome);
            }
        }
    }

    /// One turn: current player moves, the move is applied (invalid moves are
    /// surfaced, never retried), the terminal condition is evaluated, and at
    /// game end both players receive their terminal reward.
    fn play_turn(&mut self, rng: &mut StdRng) -> Result<Option<Outcome>, TrainingError> {
        let mover = self.current;
        let symbol = self.players[mover].symbol();

        let position = self.players[mover].select_move(&self.board, rng)?;
        self.board
            .apply_move(position, symbol)
            .map_err(|kind| TrainingError::InvalidMove { position, kind })?;

        if self.board.is_terminal() {
            let outcome = match self.board.check_winner() {
                Some(winner) => Outcome::Winner(winner),
                None => Outcome::Draw,
            };
            self.outcome = Some(outcome);

            let idle = 1 - mover;
            let mover_reward = reward_for(self.players[mover].symbol(), outcome);
            let idle_reward = reward_for(self.players[idle].symbol(), outcome);
            self.players[mover].finish_episode(mover_reward);
            self.players[idle].finish_episode(idle_reward);

            return Ok(Some(outcome));
        }

        self.current = 1 - self.current;
        Ok(None)
    }
}
