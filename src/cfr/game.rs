//! Game trait definition for the CFR engine.
//!
//! Any game that implements the `Game` trait can be trained with either
//! traversal variant. The engine only ever talks to the game through this
//! contract, so a new action encoding (for example a Scrabble move
//! generator) is a drop-in `legal_actions`/`apply` pair.

use std::fmt::Debug;
use std::hash::Hash;

use crate::cfr::error::Result;

/// Trait for actions that can be taken in a game.
///
/// Actions must be cloneable, comparable, and hashable for storage in maps.
pub trait Action: Clone + Eq + Hash + Debug + Send + Sync {
    /// Stable identifier of the action, used as its key inside the
    /// information set store. Distinct legal actions at a state must have
    /// distinct labels.
    fn label(&self) -> String;
}

/// Trait for game states.
///
/// A game state contains all information about the current position,
/// including information that the acting player may not observe. States are
/// immutable from the engine's point of view: `Game::apply` always returns a
/// fresh state, so sibling branches of a traversal never alias.
pub trait GameState: Clone + Debug + Send + Sync {}

/// The main Game trait that defines the interface for any game.
///
/// # Example
/// ```ignore
/// struct MyGame;
///
/// impl Game for MyGame {
///     type State = MyGameState;
///     type Action = MyAction;
///
///     // ... implement required methods
/// }
/// ```
pub trait Game: Clone + Send + Sync {
    /// The type representing a complete game state.
    type State: GameState;

    /// The type representing an action a player can take.
    type Action: Action;

    /// Get the total number of players in the game.
    fn num_players(&self) -> usize;

    /// Create the initial game state.
    fn initial_state(&self) -> Self::State;

    /// Legal actions at `state`, in a deterministic order.
    ///
    /// Returns an empty vector at terminal states. The order must be the same
    /// on every call for the same state so regret tables index consistently.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply an action to a state and return the resulting new state.
    ///
    /// Must not modify the input state.
    ///
    /// # Errors
    /// [`CfrError::IllegalAction`](crate::cfr::CfrError::IllegalAction) if
    /// `action` is not in `legal_actions(state)`.
    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State>;

    /// Check if the given state is terminal (game over).
    fn is_terminal(&self, state: &Self::State) -> bool;

    /// Payoff for `player` at a terminal state.
    ///
    /// # Errors
    /// [`CfrError::UndefinedUtility`](crate::cfr::CfrError::UndefinedUtility)
    /// if the state is not terminal.
    fn utility(&self, state: &Self::State, player: usize) -> Result<f64>;

    /// Index of the player to act, or `None` at terminal states.
    fn acting_player(&self, state: &Self::State) -> Option<usize>;

    /// Key of the information set `player` is in at `state`.
    ///
    /// Histories that are indistinguishable to `player` must map to the same
    /// key; distinguishable ones must map to different keys.
    fn information_set_key(&self, state: &Self::State, player: usize) -> String;

    /// Identifier of the game (and its parameters) stored in checkpoints.
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }

    /// Human-readable name for an action. Defaults to its label.
    fn action_label(&self, action: &Self::Action) -> String {
        action.label()
    }

    /// Human-readable description of a state, used in diagnostics.
    fn describe(&self, state: &Self::State) -> String {
        format!("{:?}", state)
    }
}

/// Macro to simplify implementing the GameState trait.
#[macro_export]
macro_rules! impl_game_state {
    ($type:ty) => {
        impl $crate::cfr::game::GameState for $type {}
    };
}
