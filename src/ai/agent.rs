use rand::rngs::StdRng;

use crate::ai::actions::{self, Action};
use crate::ai::features::{self, FeatureVector};
use crate::ai::q_table::SharedQTable;
use crate::error::TrainingError;
use crate::game::{Board, Symbol};
use crate::training::metrics::SharedMetrics;

/// One move awaiting its TD update: the state it was chosen in and the
/// action taken. Each learning player holds at most one.
#[derive(Debug, Clone, Copy)]
pub struct PendingTransition {
    pub state: FeatureVector,
    pub action: Action,
}

/// Universal interface for all players. The orchestrator only ever calls
/// these methods; a move that fails validation is surfaced as an error, not
/// retried on the player's behalf.
pub trait Agent {
    /// The symbol this player places.
    fn symbol(&self) -> Symbol;

    /// Return the player's display name.
    fn name(&self) -> &str;

    /// Choose a position on the given board.
    fn select_move(&mut self, board: &Board, rng: &mut StdRng) -> Result<usize, TrainingError>;

    /// Called at the start of every episode.
    fn begin_episode(&mut self) {}

    /// Called once at episode end with this player's terminal reward
    /// (win +1, loss -1, draw 0).
    fn finish_episode(&mut self, _reward: f64) {}
}

/// Player driven by the shared Q-table. In learning mode it selects
/// epsilon-greedily and applies TD(0) updates deferred by one half-turn: the
/// update for a move is issued when the next own move is about to be chosen,
/// using the state observed at that point as the successor, or at game end
/// with the terminal reward and no successor.
pub struct QLearningAgent {
    symbol: Symbol,
    name: String,
    table: SharedQTable,
    learning: bool,
    pending: Option<PendingTransition>,
    metrics: Option<SharedMetrics>,
}

impl QLearningAgent {
    /// Create a learning agent.
    pub fn new(symbol: Symbol, name: impl Into<String>, table: SharedQTable) -> Self {
        QLearningAgent {
            symbol,
            name: name.into(),
            table,
            learning: true,
            pending: None,
            metrics: None,
        }
    }

    /// Create an evaluation agent: pure argmax play, no table updates.
    pub fn greedy(symbol: Symbol, name: impl Into<String>, table: SharedQTable) -> Self {
        QLearningAgent {
            learning: false,
            ..Self::new(symbol, name, table)
        }
    }

    /// Attach a metrics collector that observes action selections.
    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_learning(&self) -> bool {
        self.learning
    }

    /// The transition still awaiting its TD update, if any.
    pub fn pending(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }
}

impl Agent for QLearningAgent {
    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, rng: &mut StdRng) -> Result<usize, TrainingError> {
        let state = features::assess(board, self.symbol);
        let valid = actions::valid_actions(board, self.symbol);
        if valid.is_empty() {
            return Err(TrainingError::NoValidActions);
        }

        if self.learning {
            // The state observed now is the successor of the previous own
            // move; settle that move's update before choosing the next one.
            if let Some(prev) = self.pending.take() {
                self.table
                    .borrow_mut()
                    .update(prev.state, prev.action, 0.0, Some((state, &valid)));
            }
        }

        let action = {
            let table = self.table.borrow();
            if self.learning {
                table.epsilon_greedy(state, &valid, rng)?
            } else {
                table.best_action(state, &valid, rng)?
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.borrow_mut().record_action(action);
        }
        if self.learning {
            self.pending = Some(PendingTransition { state, action });
        }

        let position = actions::resolve(action, board, self.symbol, rng)
            .expect("a valid action must resolve to a position");
        Ok(position)
    }

    fn begin_episode(&mut self) {
        self.pending = None;
    }

    fn finish_episode(&mut self, reward: f64) {
        if !self.learning {
            return;
        }
        if let Some(prev) = self.pending.take() {
            self.table
                .borrow_mut()
                .update(prev.state, prev.action, reward, None);
        }
    }
}

/// Adapts an external move source (the input layer's `get_move` capability)
/// to the `Agent` interface. The callback must return a position that passes
/// `Board::is_valid_move`; the orchestrator surfaces an invalid result as an
/// error instead of retrying.
pub struct ExternalPlayer<F> {
    symbol: Symbol,
    name: String,
    get_move: F,
}

impl<F> ExternalPlayer<F>
where
    F: FnMut(&Board) -> usize,
{
    pub fn new(symbol: Symbol, name: impl Into<String>, get_move: F) -> Self {
        ExternalPlayer {
            symbol,
            name: name.into(),
            get_move,
        }
    }
}

impl<F> Agent for ExternalPlayer<F>
where
    F: FnMut(&Board) -> usize,
{
    fn symbol(&self) -> Symbol {
        self.symbol
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn select_move(&mut self, board: &Board, _rng: &mut StdRng) -> Result<usize, TrainingError> {
        Ok((self.get_move)(board))
    }
}
