//! Counterfactual Regret Minimization engine.
//!
//! The engine is generic over any game implementing [`Game`] and offers two
//! traversals:
//!
//! - **Vanilla CFR**: full tree traversal per player per iteration
//! - **Outcome-sampling MCCFR**: one sampled trajectory per player per
//!   iteration, with an epsilon-on-policy sampler for the traverser
//!
//! Both can use CFR+ regret flooring and linear averaging.
//!
//! # Usage
//!
//! 1. Implement the `Game` trait for your game
//! 2. Create a `CfrSolver` with your game and configuration
//! 3. Call `train()` to run iterations
//! 4. Read strategies with `average_strategy()` or play them through
//!    `average_policy()`
//!
//! # Example
//!
//! ```
//! use cfr_engine::cfr::{CfrConfig, CfrSolver};
//! use cfr_engine::games::tictactoe::TicTacToe;
//!
//! let mut solver = CfrSolver::new(TicTacToe::new(2), CfrConfig::fast()).unwrap();
//! let stats = solver.train(20).unwrap();
//! println!("Trained {} info sets in {:.2}s", stats.info_sets, stats.elapsed_seconds);
//!
//! let strategy = solver.average_strategy("----").unwrap();
//! assert!((strategy.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```
//!
//! # Theory
//!
//! **Regret**: the difference between the value of an action and the value
//! of the current strategy, weighted by the probability that the other
//! players reach the decision.
//! ```text
//! Regret(a) = Value(a) - Value(current_strategy)
//! ```
//!
//! **Regret Matching**: strategy proportional to positive cumulative regret.
//! ```text
//! Strategy(a) = max(0, Regret(a)) / sum(max(0, Regret(a')))
//! ```
//!
//! **Convergence**: average regret decreases as O(1/sqrt(T)), and in
//! two-player zero-sum games the average strategy converges to a Nash
//! equilibrium.
//!
//! # References
//!
//! - Zinkevich, M., et al. "Regret Minimization in Games with Incomplete Information" (2007)
//! - Lanctot, M. "Monte Carlo Sampling and Regret Minimization for Equilibrium
//!   Computation and Decision-Making in Large Extensive Form Games" (2013)
//! - Tammelin, O. "Solving Large Imperfect Information Games Using CFR+" (2014)

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod outcome_sampling;
pub mod solver;
pub mod storage;
pub mod strategy;
pub mod traversal;
pub mod vanilla;

#[cfg(test)]
pub(crate) mod test_games;

// Re-export main types for convenient access
pub use checkpoint::Checkpoint;
pub use config::{CfrConfig, CfrStats, CfrVariant, EvaluationPoint, TrainingConfig};
pub use error::{CfrError, ConfigError, Result};
pub use evaluation::{
    AveragePolicy, GreedyPolicy, MatchRecord, MatchReport, OutcomeDistribution, Policy,
    RandomPolicy,
};
pub use game::{Action, Game, GameState};
pub use outcome_sampling::OutcomeSamplingCfr;
pub use solver::CfrSolver;
pub use storage::{InfoSetNode, InfoSetStore, StoreSnapshot};
pub use traversal::Traversal;
pub use vanilla::VanillaCfr;
