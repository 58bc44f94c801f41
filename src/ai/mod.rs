pub mod actions;
mod agent;
pub mod features;
pub mod q_table;
mod random;

pub use actions::Action;
pub use agent::{Agent, ExternalPlayer, PendingTransition, QLearningAgent};
pub use features::FeatureVector;
pub use q_table::{QTable, SharedQTable};
pub use random::RandomAgent;
