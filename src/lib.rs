//! # CFR Engine
//!
//! A generic Counterfactual Regret Minimization (CFR) trainer for
//! extensive-form games, with tic-tac-toe as the bundled game.
//!
//! ## Features
//!
//! - **Generic CFR Engine**: works with any game implementing the `Game` trait
//! - **Two Traversals**: vanilla CFR and outcome-sampling MCCFR, optionally
//!   with CFR+ and linear averaging
//! - **Reproducible**: seeded sampling and key-sorted exports
//! - **Checkpointing**: save and resume solver state as JSON
//! - **Evaluation**: matches against a random baseline, exact outcome
//!   distributions and exploitability
//!
//! ## Quick Start
//!
//! ```
//! use cfr_engine::{CfrConfig, CfrSolver};
//! use cfr_engine::games::tictactoe::TicTacToe;
//!
//! let mut solver = CfrSolver::new(TicTacToe::new(2), CfrConfig::vanilla()).unwrap();
//! solver.train(5).unwrap();
//!
//! // One entry per cell of the empty 2x2 board.
//! let strategy = solver.average_strategy("----").unwrap();
//! assert_eq!(strategy.len(), 4);
//! ```
//!
//! ## Modules
//!
//! - [`cfr`]: core CFR algorithm and solver
//! - [`games`]: game implementations
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      CfrSolver (Generic)                        │
//! │  - Vanilla / outcome-sampling traversal   - Checkpoints         │
//! │  - Information set store                  - Evaluation          │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               │ implements Game trait
//!                               ▼
//!                        ┌─────────────┐
//!                        │ Tic-tac-toe │
//!                        │  (N x N)    │
//!                        └─────────────┘
//! ```

#![warn(missing_docs)]

/// CFR (Counterfactual Regret Minimization) solver module.
///
/// This is the core module containing the generic CFR algorithm.
pub mod cfr;

/// Game implementations module.
pub mod games;

// Re-export commonly used types at crate root for convenience
pub use cfr::{Action, CfrConfig, CfrError, CfrSolver, CfrStats, Game, GameState, TrainingConfig};
