use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ai::features::FeatureVector;
use crate::ai::q_table::QTable;
use crate::ai::Action;

/// Shared handle so agents can report action selections while the trainer
/// owns the snapshots.
pub type SharedMetrics = Rc<RefCell<LearningMetrics>>;

/// Tracks learning metrics during training: action-selection counts per
/// reporting interval, the best action for a few standing feature slices,
/// and table size over time. Purely observational; never consulted by the
/// policy or the table.
#[derive(Debug, Default)]
pub struct LearningMetrics {
    action_counts: HashMap<Action, usize>,
    can_win_best: Vec<(Action, f64)>,
    must_block_best: Vec<(Action, f64)>,
    center_available_best: Vec<(Action, f64)>,
    table_sizes: Vec<usize>,
}

impl LearningMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedMetrics {
        Rc::new(RefCell::new(self))
    }

    /// Record an action selection.
    pub fn record_action(&mut self, action: Action) {
        *self.action_counts.entry(action).or_insert(0) += 1;
    }

    pub fn action_counts(&self) -> &HashMap<Action, usize> {
        &self.action_counts
    }

    /// Reset action counts at the end of a reporting interval.
    pub fn reset_action_counts(&mut self) {
        self.action_counts.clear();
    }

    /// The action with the highest mean stored value over all table entries
    /// whose state satisfies `predicate`; `None` when no entry matches.
    pub fn best_action_for<P>(table: &QTable, predicate: P) -> Option<(Action, f64)>
    where
        P: Fn(&FeatureVector) -> bool,
    {
        let mut sums: HashMap<Action, (f64, usize)> = HashMap::new();
        for (state, action, value) in table.entries() {
            if predicate(&state) {
                let slot = sums.entry(action).or_insert((0.0, 0));
                slot.0 += value;
                slot.1 += 1;
            }
        }

        let mut best: Option<(Action, f64)> = None;
        for action in Action::ALL {
            if let Some(&(sum, count)) = sums.get(&action) {
                let mean = sum / count as f64;
                if best.map_or(true, |(_, best_mean)| mean > best_mean) {
                    best = Some((action, mean));
                }
            }
        }
        best
    }

    /// Append a snapshot of the standing strategic slices.
    pub fn record_snapshot(&mut self, table: &QTable) {
        if let Some(best) = Self::best_action_for(table, |s| s.can_win_this_turn) {
            self.can_win_best.push(best);
        }
        if let Some(best) = Self::best_action_for(table, |s| s.must_block_this_turn) {
            self.must_block_best.push(best);
        }
        if let Some(best) = Self::best_action_for(table, |s| s.center_zone_available > 0) {
            self.center_available_best.push(best);
        }
    }

    /// Record Q-table size.
    pub fn record_table_size(&mut self, size: usize) {
        self.table_sizes.push(size);
    }

    pub fn can_win_history(&self) -> &[(Action, f64)] {
        &self.can_win_best
    }

    pub fn must_block_history(&self) -> &[(Action, f64)] {
        &self.must_block_best
    }

    pub fn center_available_history(&self) -> &[(Action, f64)] {
        &self.center_available_best
    }

    pub fn table_sizes(&self) -> &[usize] {
        &self.table_sizes
    }

    /// Interval report: table size, strategic best actions, and the action
    /// distribution with percentage bars.
    pub fn format_report(&self, episode: usize, total_episodes: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "--- learning metrics, episode {}/{} ---\n",
            episode, total_episodes
        ));

        if let Some(size) = self.table_sizes.last() {
            out.push_str(&format!("Q-table size: {} state-action pairs\n", size));
        }

        out.push_str("Best action by state feature:\n");
        for (label, history) in [
            ("can win", &self.can_win_best),
            ("must block", &self.must_block_best),
            ("center available", &self.center_available_best),
        ] {
            if let Some((action, value)) = history.last() {
                out.push_str(&format!(
                    "  '{}' -> {:<14} (Q={:>8.4})\n",
                    label,
                    action.name(),
                    value
                ));
            }
        }

        let total_actions: usize = self.action_counts.values().sum();
        if total_actions > 0 {
            out.push_str("Action distribution:\n");
            let mut counts: Vec<(Action, usize)> = self
                .action_counts
                .iter()
                .map(|(&action, &count)| (action, count))
                .collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            for (action, count) in counts {
                let percentage = 100.0 * count as f64 / total_actions as f64;
                let bar = "#".repeat((percentage / 2.0) as usize);
                out.push_str(&format!(
                    "  {:<14} {:>6} ({:>5.1}%) {}\n",
                    action.name(),
                    count,
                    percentage,
                    bar
                ));
            }
        }

        out
    }
}
