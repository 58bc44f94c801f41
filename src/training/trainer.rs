use std::path::PathBuf;

use rand::rngs::StdRng;

use crate::ai::q_table::SharedQTable;
use crate::ai::QLearningAgent;
use crate::error::TrainingError;
use crate::game::{Symbol, Variant};
use crate::training::episode::{Episode, Outcome};
use crate::training::metrics::LearningMetrics;

/// Trainer configuration, loadable from the `[training]` config section.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub num_episodes: usize,
    pub log_interval: usize,
    /// Wildcards per game; `None` uses the variant default (0 on 3x3, 2 on 4x4).
    pub wildcard_count: Option<usize>,
    pub table_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            num_episodes: 5_000,
            log_interval: 1_000,
            wildcard_count: None,
            table_path: PathBuf::from("q_table.json"),
        }
    }
}

/// Per-run outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrainingStats {
    pub wins_x: usize,
    pub wins_o: usize,
    pub draws: usize,
}

impl TrainingStats {
    pub fn total(&self) -> usize {
        self.wins_x + self.wins_o + self.draws
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Winner(Symbol::X) => self.wins_x += 1,
            Outcome::Winner(Symbol::O) => self.wins_o += 1,
            Outcome::Draw => self.draws += 1,
        }
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            100.0 * count as f64 / self.total() as f64
        }
    }
}

/// Self-play trainer: runs episodes strictly sequentially, both sides driven
/// by learning agents sharing one Q-table.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Self {
        Trainer { config }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training loop, mutating the shared table in place.
    pub fn train(
        &self,
        variant: Variant,
        table: &SharedQTable,
        rng: &mut StdRng,
    ) -> Result<TrainingStats, TrainingError> {
        let wildcards = self
            .config
            .wildcard_count
            .unwrap_or_else(|| variant.default_wildcards());
        let interval = self.config.log_interval.max(1);
        let total = self.config.num_episodes;

        let metrics = LearningMetrics::new().into_shared();
        let mut stats = TrainingStats::default();

        println!(
            "Training on the {} board for {} episodes ({} wildcards per game)...",
            variant.name(),
            total,
            wildcards
        );
        {
            let t = table.borrow();
            println!(
                "Hyperparameters: alpha={}, gamma={}, epsilon={}",
                t.alpha(),
                t.gamma(),
                t.epsilon()
            );
        }
        println!("-------------------------------------------");

        for episode_idx in 1..=total {
            let agent_x = QLearningAgent::new(Symbol::X, "Agent 1", table.clone())
                .with_metrics(metrics.clone());
            let agent_o = QLearningAgent::new(Symbol::O, "Agent 2", table.clone())
                .with_metrics(metrics.clone());

            let mut episode = Episode::new(
                [Box::new(agent_x), Box::new(agent_o)],
                variant,
                wildcards,
                rng,
            )?;
            stats.record(episode.run(rng)?);

            if episode_idx % interval == 0 {
                let mut m = metrics.borrow_mut();
                {
                    let t = table.borrow();
                    m.record_snapshot(&t);
                    m.record_table_size(t.len());
                }
                println!("{}", m.format_report(episode_idx, total));
                m.reset_action_counts();
            }
        }

        println!("-------------------------------------------");
        println!("Training complete. Total episodes: {}", stats.total());
        println!(
            "X wins: {} ({:.1}%) | O wins: {} ({:.1}%) | draws: {} ({:.1}%)",
            stats.wins_x,
            stats.percent(stats.wins_x),
            stats.wins_o,
            stats.percent(stats.wins_o),
            stats.draws,
            stats.percent(stats.draws),
        );
        println!("Final Q-table size: {} entries", table.borrow().len());

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::q_table::QTable;
    use rand::SeedableRng;

    fn config(episodes: usize) -> TrainerConfig {
        TrainerConfig {
            num_episodes: episodes,
            log_interval: 1_000_000, // keep test output quiet
            wildcard_count: None,
            table_path: PathBuf::from("unused.json"),
        }
    }

    #[test]
    fn test_stats_record_and_percent() {
        let mut stats = TrainingStats::default();
        stats.record(Outcome::Winner(Symbol::X));
        stats.record(Outcome::Winner(Symbol::X));
        stats.record(Outcome::Winner(Symbol::O));
        stats.record(Outcome::Draw);
        assert_eq!(stats.wins_x, 2);
        assert_eq!(stats.wins_o, 1);
        assert_eq!(stats.draws, 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_training_runs_and_grows_table() {
        let trainer = Trainer::new(config(50));
        let table = QTable::new(0.1, 0.9, 0.2).into_shared();
        let mut rng = StdRng::seed_from_u64(21);

        let stats = trainer.train(Variant::Classic3, &table, &mut rng).unwrap();
        assert_eq!(stats.total(), 50);
        assert!(!table.borrow().is_empty());
    }

    #[test]
    fn test_training_on_dual_board_with_wildcards() {
        let trainer = Trainer::new(TrainerConfig {
            wildcard_count: Some(2),
            ..config(25)
        });
        let table = QTable::new(0.1, 0.9, 0.2).into_shared();
        let mut rng = StdRng::seed_from_u64(22);

        let stats = trainer.train(Variant::Dual4, &table, &mut rng).unwrap();
        assert_eq!(stats.total(), 25);
        assert!(!table.borrow().is_empty());
    }

    #[test]
    fn test_seeded_runs_are_bit_identical() {
        let run = |seed: u64| {
            let trainer = Trainer::new(config(100));
            let table = QTable::new(0.1, 0.9, 0.2).into_shared();
            let mut rng = StdRng::seed_from_u64(seed);
            let stats = trainer.train(Variant::Dual4, &table, &mut rng).unwrap();
            (stats, table)
        };

        let (stats_a, table_a) = run(42);
        let (stats_b, table_b) = run(42);
        assert_eq!(stats_a, stats_b);
        assert_eq!(*table_a.borrow(), *table_b.borrow());

        // Serialized forms match byte for byte as well.
        let dir = tempfile::tempdir().unwrap();
        let path_a = dir.path().join("a.json");
        let path_b = dir.path().join("b.json");
        table_a.borrow().save(&path_a).unwrap();
        table_b.borrow().save(&path_b).unwrap();
        assert_eq!(
            std::fs::read(&path_a).unwrap(),
            std::fs::read(&path_b).unwrap()
        );

        let (stats_c, table_c) = run(43);
        // A different seed is allowed to coincide, but a differing table or
        // stats proves the seed actually steers the run; with 100 episodes
        // collisions are vanishingly unlikely.
        assert!(stats_c != stats_a || *table_c.borrow() != *table_a.borrow());
    }
}
