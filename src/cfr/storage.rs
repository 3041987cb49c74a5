//! Storage for CFR regrets and strategy sums.
//!
//! The store is plain owned data: traversals receive it as `&mut` so all
//! mutation is serialized by the borrow checker. A parallel trainer would
//! have to shard it by key or wrap it in a lock; nothing here is
//! synchronized internally.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::cfr::error::{CfrError, Result};
use crate::cfr::strategy::{normalize_or_uniform, regret_matching};

/// Accumulated statistics for one information set.
///
/// `actions`, `regret_sum` and `strategy_sum` are aligned by index, in the
/// order the game listed its legal actions when the set was first visited.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfoSetNode {
    actions: Vec<String>,
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
}

impl InfoSetNode {
    /// Create a zero-initialized node over `actions`.
    pub fn new(actions: Vec<String>) -> Self {
        let n = actions.len();
        Self {
            actions,
            regret_sum: vec![0.0; n],
            strategy_sum: vec![0.0; n],
        }
    }

    /// Action labels, in table order.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Cumulative counterfactual regret per action.
    pub fn regret_sum(&self) -> &[f64] {
        &self.regret_sum
    }

    /// Cumulative strategy weight per action.
    pub fn strategy_sum(&self) -> &[f64] {
        &self.strategy_sum
    }

    /// Number of known actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the node has no known actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Table index of `action`, if known.
    pub fn position(&self, action: &str) -> Option<usize> {
        self.actions.iter().position(|a| a == action)
    }

    /// Table index of `action`, appending a zeroed slot if it is unseen.
    pub fn ensure_action(&mut self, action: &str) -> usize {
        match self.position(action) {
            Some(i) => i,
            None => {
                self.actions.push(action.to_string());
                self.regret_sum.push(0.0);
                self.strategy_sum.push(0.0);
                self.actions.len() - 1
            }
        }
    }

    /// Regret-matching strategy over the known actions.
    pub fn current_strategy(&self) -> Vec<f64> {
        regret_matching(&self.regret_sum)
    }

    /// Time-averaged strategy; uniform if no weight has been accumulated.
    pub fn average_strategy(&self) -> Vec<f64> {
        normalize_or_uniform(&self.strategy_sum)
    }

    fn check_len(&self, key: &str, found: usize) -> Result<()> {
        if self.len() != found {
            return Err(CfrError::ActionMismatch {
                key: key.to_string(),
                expected: self.len(),
                found,
            });
        }
        Ok(())
    }
}

/// Owned store mapping information set keys to their statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoSetStore {
    nodes: FxHashMap<String, InfoSetNode>,
}

impl InfoSetStore {
    /// Create new empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Return the node for `key`, inserting a zeroed one over `actions` if
    /// the key is new. Actions the existing node has not seen are appended.
    pub fn get_or_create(&mut self, key: &str, actions: &[String]) -> &mut InfoSetNode {
        let node = self
            .nodes
            .entry(key.to_string())
            .or_insert_with(|| InfoSetNode::new(actions.to_vec()));
        if node.actions() != actions {
            for action in actions {
                node.ensure_action(action);
            }
        }
        node
    }

    fn entry(&mut self, key: &str) -> &mut InfoSetNode {
        self.nodes.entry(key.to_string()).or_default()
    }

    /// Add `delta` to the regret of `action` at `key`.
    pub fn accumulate_regret(&mut self, key: &str, action: &str, delta: f64) {
        let node = self.entry(key);
        let i = node.ensure_action(action);
        node.regret_sum[i] += delta;
    }

    /// Add `weight` to the cumulative strategy weight of `action` at `key`.
    ///
    /// # Errors
    /// [`CfrError::NegativeWeight`] if `weight < 0`.
    pub fn accumulate_strategy(&mut self, key: &str, action: &str, weight: f64) -> Result<()> {
        if weight < 0.0 {
            return Err(CfrError::NegativeWeight {
                key: key.to_string(),
                weight,
            });
        }
        let node = self.entry(key);
        let i = node.ensure_action(action);
        node.strategy_sum[i] += weight;
        Ok(())
    }

    /// Add a regret delta for every action of an existing node.
    ///
    /// When `floor_at_zero` is set (CFR+), negative sums are reset to 0.
    pub fn accumulate_regrets(&mut self, key: &str, deltas: &[f64], floor_at_zero: bool) -> Result<()> {
        let node = self.node_mut(key, deltas.len())?;
        for (sum, &delta) in node.regret_sum.iter_mut().zip(deltas) {
            *sum += delta;
            if floor_at_zero && *sum < 0.0 {
                *sum = 0.0;
            }
        }
        Ok(())
    }

    /// Add `strategy * weight` to the strategy sums of an existing node.
    pub fn accumulate_strategies(&mut self, key: &str, strategy: &[f64], weight: f64) -> Result<()> {
        if weight < 0.0 {
            return Err(CfrError::NegativeWeight {
                key: key.to_string(),
                weight,
            });
        }
        let node = self.node_mut(key, strategy.len())?;
        for (sum, &prob) in node.strategy_sum.iter_mut().zip(strategy) {
            *sum += prob * weight;
        }
        Ok(())
    }

    fn node_mut(&mut self, key: &str, found: usize) -> Result<&mut InfoSetNode> {
        let node = self.nodes.get_mut(key).ok_or_else(|| CfrError::ActionMismatch {
            key: key.to_string(),
            expected: 0,
            found,
        })?;
        node.check_len(key, found)?;
        Ok(node)
    }

    /// Current (regret-matching) strategy for `key`.
    pub fn current_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.nodes.get(key).map(InfoSetNode::current_strategy)
    }

    /// Average strategy for `key`, aligned with the node's action order.
    pub fn average_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.nodes.get(key).map(InfoSetNode::average_strategy)
    }

    /// Average strategy for `key` as `(action, probability)` pairs.
    pub fn average_strategy_by_action(&self, key: &str) -> Option<Vec<(String, f64)>> {
        self.nodes.get(key).map(|node| {
            node.actions
                .iter()
                .cloned()
                .zip(node.average_strategy())
                .collect()
        })
    }

    /// Look up a node.
    pub fn get(&self, key: &str) -> Option<&InfoSetNode> {
        self.nodes.get(key)
    }

    /// Check if an info set exists in storage.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Get the number of information sets stored.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no information set has been visited yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all keys (arbitrary order).
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.nodes.keys()
    }

    /// Iterate over all nodes (arbitrary order).
    pub fn iter(&self) -> impl Iterator<Item = (&String, &InfoSetNode)> {
        self.nodes.iter()
    }

    /// Clear all stored data.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Get total memory usage estimate in bytes.
    pub fn memory_usage(&self) -> usize {
        self.nodes
            .iter()
            .map(|(k, node)| {
                let labels: usize = node.actions.iter().map(String::len).sum();
                k.len() + labels + 2 * node.len() * std::mem::size_of::<f64>()
            })
            .sum()
    }

    /// Export storage to a key-sorted, serializable snapshot.
    pub fn export(&self) -> StoreSnapshot {
        StoreSnapshot {
            nodes: self
                .nodes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    /// Replace the contents with a snapshot.
    pub fn import(&mut self, snapshot: StoreSnapshot) {
        self.nodes = snapshot.nodes.into_iter().collect();
    }
}

/// Serializable export format for storage. Sorted by key, so the same
/// contents always encode to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Nodes by information set key.
    pub nodes: BTreeMap<String, InfoSetNode>,
}

/// Snapshot of average strategies for convergence-indicator calculation.
#[derive(Debug, Clone, Default)]
pub struct StrategySnapshot {
    /// Average strategies: info_key -> [probability per action]
    pub strategies: FxHashMap<String, Vec<f64>>,
    /// Strategy sum totals, used to tell visited info sets apart.
    pub totals: FxHashMap<String, f64>,
}

impl InfoSetStore {
    /// Create a snapshot of all current average strategies.
    pub fn snapshot_strategies(&self) -> StrategySnapshot {
        let mut strategies = FxHashMap::default();
        let mut totals = FxHashMap::default();

        for (key, node) in self.nodes.iter() {
            strategies.insert(key.clone(), node.average_strategy());
            totals.insert(key.clone(), node.strategy_sum.iter().sum());
        }

        StrategySnapshot { strategies, totals }
    }

    /// Convergence Indicator (CI): how much average strategies moved since
    /// `snapshot`.
    ///
    /// CI = 100 * mean over visited info sets of the L1 distance between the
    /// current and the snapshot average strategy. Info sets new since the
    /// snapshot are compared against uniform. Lower means more stable; the
    /// maximum is 200. Returns infinity when nothing can be compared.
    pub fn convergence_indicator(&self, snapshot: &StrategySnapshot) -> f64 {
        let mut total_change = 0.0;
        let mut num_info_sets = 0;

        for (key, node) in self.nodes.iter() {
            let current_total: f64 = node.strategy_sum.iter().sum();
            let old_total = snapshot.totals.get(key).copied().unwrap_or(0.0);

            // Unvisited on both sides: uniform vs uniform.
            if current_total == 0.0 && old_total == 0.0 {
                continue;
            }

            let new_strategy = node.average_strategy();
            let change: f64 = match snapshot.strategies.get(key) {
                Some(old) if old.len() == new_strategy.len() => new_strategy
                    .iter()
                    .zip(old.iter())
                    .map(|(&new, &old)| (new - old).abs())
                    .sum(),
                _ => {
                    let uniform_prob = 1.0 / new_strategy.len().max(1) as f64;
                    new_strategy
                        .iter()
                        .map(|&prob| (prob - uniform_prob).abs())
                        .sum()
                }
            };
            total_change += change;
            num_info_sets += 1;
        }

        if num_info_sets == 0 {
            return f64::INFINITY;
        }

        100.0 * total_change / num_info_sets as f64
    }
}
