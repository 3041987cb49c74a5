//! Vanilla CFR: full tree traversal per player per iteration.
//!
//! Reach probabilities are split into the traverser's own contribution and
//! the product of every other player's. At the traverser's nodes:
//!
//! ```text
//! regret(a)       += (v(a) - v(node)) * reach_others
//! strategy_sum(a) += strategy(a) * reach_traverser
//! ```
//!
//! With pruning on, a subtree is skipped only when both reaches into it are
//! zero. A zero `reach_others` alone still leaves the traverser's strategy
//! sums to accumulate.

use crate::cfr::config::CfrConfig;
use crate::cfr::error::Result;
use crate::cfr::game::Game;
use crate::cfr::storage::InfoSetStore;
use crate::cfr::traversal::{averaging_weight, decision, Traversal};

/// Full-traversal CFR engine.
#[derive(Debug, Clone, Default)]
pub struct VanillaCfr {
    use_cfr_plus: bool,
    use_linear_averaging: bool,
    pruning: bool,
}

impl VanillaCfr {
    /// Build the engine from the relevant solver settings.
    pub fn new(config: &CfrConfig) -> Self {
        Self {
            use_cfr_plus: config.use_cfr_plus,
            use_linear_averaging: config.use_linear_averaging,
            pruning: config.pruning,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn cfr<G: Game>(
        &self,
        game: &G,
        store: &mut InfoSetStore,
        state: &G::State,
        traverser: usize,
        reach_traverser: f64,
        reach_others: f64,
        iteration: u64,
    ) -> Result<f64> {
        if game.is_terminal(state) {
            return game.utility(state, traverser);
        }

        let node = decision(game, store, state)?;
        let own_turn = node.actor == traverser;

        let mut action_values = vec![0.0; node.actions.len()];
        let mut node_value = 0.0;

        for (i, action) in node.actions.iter().enumerate() {
            let prob = node.strategy[i];
            let (child_traverser, child_others) = if own_turn {
                (reach_traverser * prob, reach_others)
            } else {
                (reach_traverser, reach_others * prob)
            };
            // Below here neither regrets nor strategy sums can change.
            if self.pruning && child_traverser == 0.0 && child_others == 0.0 {
                continue;
            }

            let next = game.apply(state, action)?;
            action_values[i] =
                self.cfr(game, store, &next, traverser, child_traverser, child_others, iteration)?;
            node_value += prob * action_values[i];
        }

        if own_turn {
            let regrets: Vec<f64> = action_values
                .iter()
                .map(|&v| (v - node_value) * reach_others)
                .collect();
            store.accumulate_regrets(&node.key, &regrets, self.use_cfr_plus)?;

            let weight = averaging_weight(reach_traverser, iteration, self.use_linear_averaging);
            store.accumulate_strategies(&node.key, &node.strategy, weight)?;
        }

        Ok(node_value)
    }
}

impl Traversal for VanillaCfr {
    fn traverse<G: Game>(
        &mut self,
        game: &G,
        store: &mut InfoSetStore,
        traverser: usize,
        iteration: u64,
    ) -> Result<f64> {
        let root = game.initial_state();
        self.cfr(game, store, &root, traverser, 1.0, 1.0, iteration)
    }
}
