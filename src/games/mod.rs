//! Game implementations for the CFR solver.
//!
//! ## Available Games
//!
//! - [`tictactoe`]: Tic-tac-toe on an N×N board
//!
//! ## Adding New Games
//!
//! To add a new game:
//!
//! 1. Create a new module under `src/games/`
//! 2. Define state and action types
//! 3. Implement the `Game` trait
//! 4. Add tests that walk the reachable states and check the contract
//!
//! See the [`tictactoe`] module for a complete example.

pub mod tictactoe;
