//! Outcome-sampling Monte Carlo CFR.
//!
//! Each traversal samples a single root-to-leaf trajectory. The traverser
//! samples from an epsilon-on-policy blend of its current strategy, every
//! other player samples on-policy. Regrets at the traverser's nodes are the
//! sampled counterfactual values divided by the probability of having
//! sampled the trajectory, which makes them unbiased estimates of the
//! vanilla CFR regrets.
//!
//! Follows the formulation in Lanctot's thesis (2013), ch. 4.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::cfr::config::CfrConfig;
use crate::cfr::error::{CfrError, Result};
use crate::cfr::game::Game;
use crate::cfr::storage::InfoSetStore;
use crate::cfr::strategy::{epsilon_blend, sample_index};
use crate::cfr::traversal::{averaging_weight, decision, Traversal};

/// Sampled-trajectory CFR engine. Owns its random number generator, so a
/// fixed seed reproduces the exact sequence of updates.
#[derive(Debug, Clone)]
pub struct OutcomeSamplingCfr {
    exploration: f64,
    use_cfr_plus: bool,
    use_linear_averaging: bool,
    rng: StdRng,
}

/// Reach bookkeeping along the sampled path: each player's own
/// contribution and the sampling probability of the prefix.
#[derive(Debug, Clone)]
struct Reach {
    players: Vec<f64>,
    sample: f64,
}

impl Reach {
    fn root(num_players: usize) -> Self {
        Self {
            players: vec![1.0; num_players],
            sample: 1.0,
        }
    }

    /// Product of every reach except `player`'s.
    fn excluding(&self, player: usize) -> f64 {
        self.players
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != player)
            .map(|(_, r)| r)
            .product()
    }

    fn child(&self, actor: usize, prob: f64, sampled: f64) -> Self {
        let mut players = self.players.clone();
        players[actor] *= prob;
        Self {
            players,
            sample: self.sample * sampled,
        }
    }
}

impl OutcomeSamplingCfr {
    /// Build the engine from the solver settings.
    pub fn new(config: &CfrConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            exploration: config.exploration,
            use_cfr_plus: config.use_cfr_plus,
            use_linear_averaging: config.use_linear_averaging,
            rng,
        }
    }

    /// Returns `(u / q(z), tail)`: the sampled leaf utility divided by the
    /// trajectory's sampling probability, and the product of strategy
    /// probabilities from this node's child to the leaf.
    fn sample<G: Game>(
        &mut self,
        game: &G,
        store: &mut InfoSetStore,
        state: &G::State,
        traverser: usize,
        reach: &Reach,
        iteration: u64,
    ) -> Result<(f64, f64)> {
        if game.is_terminal(state) {
            return Ok((game.utility(state, traverser)? / reach.sample, 1.0));
        }

        let node = decision(game, store, state)?;
        let own_turn = node.actor == traverser;

        let sampling = if own_turn {
            epsilon_blend(&node.strategy, self.exploration)
        } else {
            node.strategy.clone()
        };
        let chosen = sample_index(&sampling, &mut self.rng).map_err(|source| CfrError::Sampling {
            key: node.key.clone(),
            source,
        })?;
        let prob = node.strategy[chosen];

        let next = game.apply(state, &node.actions[chosen])?;
        let child_reach = reach.child(node.actor, prob, sampling[chosen]);
        let (value, tail) = self.sample(game, store, &next, traverser, &child_reach, iteration)?;

        if own_turn {
            let weight = value * reach.excluding(traverser);
            let regrets: Vec<f64> = (0..node.actions.len())
                .map(|a| {
                    if a == chosen {
                        weight * tail * (1.0 - prob)
                    } else {
                        -weight * tail * prob
                    }
                })
                .collect();
            store.accumulate_regrets(&node.key, &regrets, self.use_cfr_plus)?;
        } else {
            let weight = averaging_weight(
                reach.players[node.actor] / reach.sample,
                iteration,
                self.use_linear_averaging,
            );
            store.accumulate_strategies(&node.key, &node.strategy, weight)?;
        }

        Ok((value, prob * tail))
    }
}

impl Traversal for OutcomeSamplingCfr {
    fn traverse<G: Game>(
        &mut self,
        game: &G,
        store: &mut InfoSetStore,
        traverser: usize,
        iteration: u64,
    ) -> Result<f64> {
        let root = game.initial_state();
        let reach = Reach::root(game.num_players());
        let (value, _) = self.sample(game, store, &root, traverser, &reach, iteration)?;
        Ok(value)
    }
}
