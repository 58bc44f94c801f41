//! Training infrastructure: episode orchestration, the sequential self-play
//! trainer, and learning metrics collection.

pub mod episode;
pub mod metrics;
pub mod trainer;

pub use episode::{reward_for, Episode, Outcome};
pub use metrics::{LearningMetrics, SharedMetrics};
pub use trainer::{Trainer, TrainerConfig, TrainingStats};
