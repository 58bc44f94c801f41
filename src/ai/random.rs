use rand::rngs::StdRng;
use rand::Rng;

use super::agent::Agent;
use crate::error::TrainingError;
use crate::game::{Board, Symbol};

/// An agent that selects uniformly at random from the empty positions.
pub struct RandomAgent {
    symbol: Symbol,
    name: String,
}

impl RandomAgent {
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Self {
        RandomAgent {
            symbol,
            name: name.into(),
        }
    }
}

impl Agent for RandomAgent {
    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, rng: &mut StdRng) -> Result<usize, TrainingError> {
        let available = board.available_positions();
        assert!(!available.is_empty(), "no legal moves available");
        Ok(available[rng.random_range(0..available.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Variant;
    use rand::SeedableRng;

    #[test]
    fn test_random_agent_selects_legal_moves() {
        let mut agent = RandomAgent::new(Symbol::X, "Random");
        let mut rng = StdRng::seed_from_u64(1);
        let mut board = Board::new(Variant::Dual4);
        board.assign_wildcards(2, &mut rng);

        for _ in 0..100 {
            let pos = agent.select_move(&board, &mut rng).unwrap();
            assert!(board.is_valid_move(pos), "position {pos} is not legal");
        }
    }

    #[test]
    fn test_random_agents_play_full_game() {
        let mut x = RandomAgent::new(Symbol::X, "Random 1");
        let mut o = RandomAgent::new(Symbol::O, "Random 2");
        let mut rng = StdRng::seed_from_u64(2);
        let mut board = Board::new(Variant::Classic3);

        let mut turn = 0;
        while !board.is_terminal() {
            let (pos, symbol) = if turn % 2 == 0 {
                (x.select_move(&board, &mut rng).unwrap(), Symbol::X)
            } else {
                (o.select_move(&board, &mut rng).unwrap(), Symbol::O)
            };
            board.apply_move(pos, symbol).unwrap();
            turn += 1;
        }

        assert!(board.is_terminal());
    }

    #[test]
    fn test_random_agent_name() {
        let agent = RandomAgent::new(Symbol::O, "Random");
        assert_eq!(agent.name(), "Random");
        assert_eq!(agent.symbol(), Symbol::O);
    }
}
