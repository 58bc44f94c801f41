//! Tabular Q-value store with epsilon-greedy selection and TD(0) updates.
//! One table is shared by both learning agents for the lifetime of a
//! training run; it is the only component that persists across episodes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::actions::Action;
use crate::ai::features::FeatureVector;
use crate::error::{TableError, TrainingError};

/// Shared handle to the one process-wide table. Execution is single-threaded
/// and strictly sequential, so interior mutability is all that is needed.
pub type SharedQTable = Rc<RefCell<QTable>>;

/// Q-learning table: maps (state, action) to a learned value estimate.
/// Unseen pairs implicitly hold 0.0.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    entries: HashMap<(FeatureVector, Action), f64>,
    alpha: f64,
    gamma: f64,
    epsilon: f64,
}

/// On-disk representation: hyperparameters plus a sorted entry list, written
/// as one unit.
#[derive(Serialize, Deserialize)]
struct TableFile {
    alpha: f64,
    gamma: f64,
    epsilon: f64,
    entries: Vec<TableEntry>,
}

#[derive(Serialize, Deserialize)]
struct TableEntry {
    state: FeatureVector,
    action: Action,
    value: f64,
}

impl QTable {
    /// Create an empty table. Hyperparameters are expected in [0, 1];
    /// configuration and load paths validate this.
    pub fn new(alpha: f64, gamma: f64, epsilon: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&alpha));
        debug_assert!((0.0..=1.0).contains(&gamma));
        debug_assert!((0.0..=1.0).contains(&epsilon));
        QTable {
            entries: HashMap::new(),
            alpha,
            gamma,
            epsilon,
        }
    }

    pub fn into_shared(self) -> SharedQTable {
        Rc::new(RefCell::new(self))
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Number of state-action pairs stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored value for a state-action pair, 0.0 if never seen.
    pub fn get(&self, state: FeatureVector, action: Action) -> f64 {
        self.entries.get(&(state, action)).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, state: FeatureVector, action: Action, value: f64) {
        self.entries.insert((state, action), value);
    }

    /// Iterate over all stored entries (observational use only).
    pub fn entries(&self) -> impl Iterator<Item = (FeatureVector, Action, f64)> + '_ {
        self.entries
            .iter()
            .map(|(&(state, action), &value)| (state, action, value))
    }

    /// Maximum stored value over `valid` actions; 0.0 when `valid` is empty.
    pub fn max_q(&self, state: FeatureVector, valid: &[Action]) -> f64 {
        if valid.is_empty() {
            return 0.0;
        }
        valid
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Action with the highest value among `valid`; exact-equality ties are
    /// broken uniformly at random. Empty `valid` is an invariant violation.
    pub fn best_action(
        &self,
        state: FeatureVector,
        valid: &[Action],
        rng: &mut StdRng,
    ) -> Result<Action, TrainingError> {
        if valid.is_empty() {
            return Err(TrainingError::NoValidActions);
        }
        let max = valid
            .iter()
            .map(|&action| self.get(state, action))
            .fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<Action> = valid
            .iter()
            .copied()
            .filter(|&action| self.get(state, action) == max)
            .collect();
        Ok(ties[rng.random_range(0..ties.len())])
    }

    /// Epsilon-greedy selection: explore uniformly with probability epsilon,
    /// otherwise exploit via `best_action`.
    pub fn epsilon_greedy(
        &self,
        state: FeatureVector,
        valid: &[Action],
        rng: &mut StdRng,
    ) -> Result<Action, TrainingError> {
        if valid.is_empty() {
            return Err(TrainingError::NoValidActions);
        }
        if rng.random::<f64>() < self.epsilon {
            return Ok(valid[rng.random_range(0..valid.len())]);
        }
        self.best_action(state, valid, rng)
    }

    /// TD(0) update: Q(s,a) += alpha * (target - Q(s,a)), where the target
    /// bootstraps from the next state's best valid action, or is the bare
    /// reward at a terminal transition.
    pub fn update(
        &mut self,
        state: FeatureVector,
        action: Action,
        reward: f64,
        next: Option<(FeatureVector, &[Action])>,
    ) {
        let current = self.get(state, action);
        let target = match next {
            None => reward,
            Some((next_state, next_valid)) => {
                reward + self.gamma * self.max_q(next_state, next_valid)
            }
        };
        self.set(state, action, current + self.alpha * (target - current));
    }

    /// Save the whole table plus hyperparameters. Writes a `.tmp` sibling
    /// first and renames it into place; entries are sorted so equal tables
    /// serialize identically.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let mut entries: Vec<TableEntry> = self
            .entries
            .iter()
            .map(|(&(state, action), &value)| TableEntry {
                state,
                action,
                value,
            })
            .collect();
        entries.sort_by(|a, b| (a.state, a.action).cmp(&(b.state, b.action)));

        let file = TableFile {
            alpha: self.alpha,
            gamma: self.gamma,
            epsilon: self.epsilon,
            entries,
        };
        let json = serde_json::to_string_pretty(&file)?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(|e| TableError::Write {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| TableError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load a table saved by `save`. Malformed files, hyperparameters outside
    /// [0, 1], and duplicate keys are all fatal; there is no partial recovery.
    pub fn load(path: &Path) -> Result<QTable, TableError> {
        let json = fs::read_to_string(path).map_err(|e| TableError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: TableFile = serde_json::from_str(&json).map_err(|e| TableError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        for (name, value) in [
            ("alpha", file.alpha),
            ("gamma", file.gamma),
            ("epsilon", file.epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(TableError::InvalidHyperparameter(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let mut entries = HashMap::with_capacity(file.entries.len());
        for entry in file.entries {
            if entries
                .insert((entry.state, entry.action), entry.value)
                .is_some()
            {
                return Err(TableError::DuplicateEntry {
                    key: format!("({:?}, {})", entry.state, entry.action.name()),
                });
            }
        }

        Ok(QTable {
            entries,
            alpha: file.alpha,
            gamma: file.gamma,
            epsilon: file.epsilon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    fn state() -> FeatureVector {
        FeatureVector {
            can_win_this_turn: false,
            must_block_this_turn: false,
            center_zone_available: 3,
            center_zone_owned: 1,
            corners_available: 2,
            edge_mids_available: 4,
            total_pieces_placed: 2,
        }
    }

    fn other_state() -> FeatureVector {
        FeatureVector {
            can_win_this_turn: true,
            ..state()
        }
    }

    #[test]
    fn test_unseen_pair_defaults_to_zero() {
        let table = QTable::new(0.1, 0.9, 0.2);
        assert_eq!(table.get(state(), Action::TakeCenter), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_set_get() {
        let mut table = QTable::new(0.1, 0.9, 0.2);
        table.set(state(), Action::TakeCenter, 0.5);
        assert_eq!(table.get(state(), Action::TakeCenter), 0.5);
        assert_eq!(table.get(state(), Action::TakeCorner), 0.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_update_terminal() {
        let mut table = QTable::new(0.1, 0.9, 0.2);
        table.update(state(), Action::WinNow, 1.0, None);
        // target = 1.0, Q was 0.0 -> 0.0 + 0.1 * 1.0
        assert!((table.get(state(), Action::WinNow) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_update_bootstraps_from_next_state() {
        let mut table = QTable::new(0.5, 0.9, 0.2);
        table.set(other_state(), Action::WinNow, 1.0);
        table.set(other_state(), Action::TakeRandom, 0.2);

        let next_valid = [Action::WinNow, Action::TakeRandom];
        table.update(state(), Action::TakeCenter, 0.0, Some((other_state(), &next_valid)));

        // target = 0 + 0.9 * 1.0 = 0.9; Q = 0 + 0.5 * 0.9 = 0.45
        assert!((table.get(state(), Action::TakeCenter) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_update_fixed_point() {
        for alpha in [0.0, 0.1, 0.5, 1.0] {
            let mut table = QTable::new(alpha, 0.9, 0.2);
            table.set(state(), Action::TakeCorner, 0.7);
            // Terminal target equal to the stored value leaves it unchanged.
            table.update(state(), Action::TakeCorner, 0.7, None);
            assert_eq!(table.get(state(), Action::TakeCorner), 0.7);
        }
    }

    #[test]
    fn test_max_q_empty_valid_is_zero() {
        let table = QTable::new(0.1, 0.9, 0.2);
        assert_eq!(table.max_q(state(), &[]), 0.0);
    }

    #[test]
    fn test_max_q_can_be_negative() {
        let mut table = QTable::new(0.1, 0.9, 0.2);
        table.set(state(), Action::TakeCenter, -0.8);
        table.set(state(), Action::TakeCorner, -0.3);
        let valid = [Action::TakeCenter, Action::TakeCorner];
        assert_eq!(table.max_q(state(), &valid), -0.3);
    }

    #[test]
    fn test_best_action_empty_valid_fails() {
        let table = QTable::new(0.1, 0.9, 0.2);
        let err = table.best_action(state(), &[], &mut rng()).unwrap_err();
        assert!(matches!(err, TrainingError::NoValidActions));
        let err = table.epsilon_greedy(state(), &[], &mut rng()).unwrap_err();
        assert!(matches!(err, TrainingError::NoValidActions));
    }

    #[test]
    fn test_best_action_returns_argmax() {
        let mut table = QTable::new(0.1, 0.9, 0.2);
        table.set(state(), Action::TakeCenter, 0.3);
        table.set(state(), Action::TakeCorner, 0.9);
        table.set(state(), Action::TakeRandom, -0.2);

        let valid = [Action::TakeCenter, Action::TakeCorner, Action::TakeRandom];
        let mut rng = rng();
        for _ in 0..100 {
            let action = table.best_action(state(), &valid, &mut rng).unwrap();
            assert_eq!(action, Action::TakeCorner);
        }
    }

    #[test]
    fn test_best_action_breaks_ties_randomly() {
        let mut table = QTable::new(0.1, 0.9, 0.2);
        table.set(state(), Action::TakeCenter, 0.5);
        table.set(state(), Action::TakeCorner, 0.5);
        table.set(state(), Action::TakeRandom, 0.1);

        let valid = [Action::TakeCenter, Action::TakeCorner, Action::TakeRandom];
        let mut rng = rng();
        let mut seen_center = false;
        let mut seen_corner = false;
        for _ in 0..200 {
            match table.best_action(state(), &valid, &mut rng).unwrap() {
                Action::TakeCenter => seen_center = true,
                Action::TakeCorner => seen_corner = true,
                other => panic!("tie-break picked non-maximal action {other:?}"),
            }
        }
        assert!(seen_center && seen_corner);
    }

    #[test]
    fn test_epsilon_zero_always_exploits() {
        let mut table = QTable::new(0.1, 0.9, 0.0);
        table.set(state(), Action::TakeCorner, 1.0);
        let valid = [Action::TakeCenter, Action::TakeCorner, Action::TakeRandom];
        let mut rng = rng();
        for _ in 0..500 {
            let action = table.epsilon_greedy(state(), &valid, &mut rng).unwrap();
            assert_eq!(action, Action::TakeCorner);
        }
    }

    #[test]
    fn test_epsilon_one_explores_uniformly() {
        let mut table = QTable::new(0.1, 0.9, 1.0);
        // A dominant stored value must not matter when always exploring.
        table.set(state(), Action::TakeCorner, 100.0);
        let valid = [Action::TakeCenter, Action::TakeCorner, Action::TakeRandom];
        let mut rng = rng();
        let mut counts = [0usize; 3];
        let trials = 600;
        for _ in 0..trials {
            let action = table.epsilon_greedy(state(), &valid, &mut rng).unwrap();
            let idx = valid.iter().position(|&a| a == action).unwrap();
            counts[idx] += 1;
        }
        // Expected 200 each; allow a wide margin for the uniform draw.
        for count in counts {
            assert!(count > 100, "distribution far from uniform: {counts:?}");
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");

        let mut table = QTable::new(0.15, 0.85, 0.3);
        table.set(state(), Action::TakeCenter, 0.42);
        table.set(state(), Action::WinNow, -1.0);
        table.set(other_state(), Action::BlockOpponent, 0.007);

        table.save(&path).unwrap();
        let loaded = QTable::load(&path).unwrap();

        assert_eq!(loaded, table);
        assert_eq!(loaded.alpha(), 0.15);
        assert_eq!(loaded.gamma(), 0.85);
        assert_eq!(loaded.epsilon(), 0.3);
    }

    #[test]
    fn test_save_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");

        let mut first = QTable::new(0.1, 0.9, 0.2);
        let mut second = QTable::new(0.1, 0.9, 0.2);
        // Insert in different orders; sorted save must not care.
        first.set(state(), Action::TakeCenter, 0.5);
        first.set(other_state(), Action::WinNow, 1.0);
        second.set(other_state(), Action::WinNow, 1.0);
        second.set(state(), Action::TakeCenter, 0.5);

        first.save(&a).unwrap();
        second.save(&b).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");
        fs::write(&path, r#"{"alpha": 0.1, "gamma": 0.9}"#).unwrap();

        let err = QTable::load(&path).unwrap_err();
        assert!(matches!(err, TableError::Parse { .. }), "got: {err}");
    }

    #[test]
    fn test_load_rejects_bad_hyperparameter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");
        fs::write(
            &path,
            r#"{"alpha": 1.5, "gamma": 0.9, "epsilon": 0.2, "entries": []}"#,
        )
        .unwrap();

        let err = QTable::load(&path).unwrap_err();
        assert!(matches!(err, TableError::InvalidHyperparameter(_)), "got: {err}");
    }

    #[test]
    fn test_load_rejects_duplicate_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");

        let entry = r#"{"state": {"can_win_this_turn": false, "must_block_this_turn": false, "center_zone_available": 1, "center_zone_owned": 0, "corners_available": 4, "edge_mids_available": 4, "total_pieces_placed": 0}, "action": "take_center", "value": 0.5}"#;
        let json = format!(
            r#"{{"alpha": 0.1, "gamma": 0.9, "epsilon": 0.2, "entries": [{entry}, {entry}]}}"#
        );
        fs::write(&path, json).unwrap();

        let err = QTable::load(&path).unwrap_err();
        assert!(matches!(err, TableError::DuplicateEntry { .. }), "got: {err}");
    }

    #[test]
    fn test_no_leftover_tmp_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q_table.json");
        QTable::new(0.1, 0.9, 0.2).save(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
