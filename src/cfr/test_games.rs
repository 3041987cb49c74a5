//! Tiny games used by the engine's unit tests.

use crate::cfr::error::{CfrError, Result};
use crate::cfr::game::{Action, Game};
use crate::impl_game_state;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Coin {
    Heads,
    Tails,
}

impl Action for Coin {
    fn label(&self) -> String {
        match self {
            Coin::Heads => "h".to_string(),
            Coin::Tails => "t".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchingState {
    pub choices: Vec<Coin>,
}

impl_game_state!(MatchingState);

/// Matching pennies as a sequential game: player 1 moves second but does
/// not observe player 0's coin. Player 0 wins on a mismatch.
#[derive(Debug, Clone, Copy)]
pub struct Matching;

impl Game for Matching {
    type State = MatchingState;
    type Action = Coin;

    fn num_players(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Self::State {
        MatchingState::default()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        vec![Coin::Heads, Coin::Tails]
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State> {
        if self.is_terminal(state) {
            return Err(CfrError::IllegalAction {
                action: action.label(),
                state: self.describe(state),
            });
        }
        let mut next = state.clone();
        next.choices.push(*action);
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.choices.len() == 2
    }

    fn utility(&self, state: &Self::State, player: usize) -> Result<f64> {
        if !self.is_terminal(state) {
            return Err(CfrError::UndefinedUtility {
                state: self.describe(state),
            });
        }
        let p0 = if state.choices[0] != state.choices[1] { 1.0 } else { -1.0 };
        Ok(if player == 0 { p0 } else { -p0 })
    }

    fn acting_player(&self, state: &Self::State) -> Option<usize> {
        (!self.is_terminal(state)).then_some(state.choices.len())
    }

    fn information_set_key(&self, _state: &Self::State, player: usize) -> String {
        format!("p{}", player)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Go;

impl Action for Go {
    fn label(&self) -> String {
        "go".to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForcedState {
    pub done: bool,
}

impl_game_state!(ForcedState);

/// One forced move by player 0, which wins the game.
#[derive(Debug, Clone, Copy)]
pub struct Forced;

impl Game for Forced {
    type State = ForcedState;
    type Action = Go;

    fn num_players(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Self::State {
        ForcedState::default()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if state.done {
            vec![]
        } else {
            vec![Go]
        }
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State> {
        if state.done {
            return Err(CfrError::IllegalAction {
                action: action.label(),
                state: self.describe(state),
            });
        }
        Ok(ForcedState { done: true })
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.done
    }

    fn utility(&self, state: &Self::State, player: usize) -> Result<f64> {
        if !state.done {
            return Err(CfrError::UndefinedUtility {
                state: self.describe(state),
            });
        }
        Ok(if player == 0 { 1.0 } else { -1.0 })
    }

    fn acting_player(&self, state: &Self::State) -> Option<usize> {
        (!state.done).then_some(0)
    }

    fn information_set_key(&self, _state: &Self::State, _player: usize) -> String {
        "start".to_string()
    }
}

/// A broken model: never terminal and never offers an action.
#[derive(Debug, Clone, Copy)]
pub struct Stuck;

impl Game for Stuck {
    type State = ForcedState;
    type Action = Go;

    fn num_players(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Self::State {
        ForcedState::default()
    }

    fn legal_actions(&self, _state: &Self::State) -> Vec<Self::Action> {
        vec![]
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State> {
        Err(CfrError::IllegalAction {
            action: action.label(),
            state: self.describe(state),
        })
    }

    fn is_terminal(&self, _state: &Self::State) -> bool {
        false
    }

    fn utility(&self, state: &Self::State, _player: usize) -> Result<f64> {
        Err(CfrError::UndefinedUtility {
            state: self.describe(state),
        })
    }

    fn acting_player(&self, _state: &Self::State) -> Option<usize> {
        Some(0)
    }

    fn information_set_key(&self, _state: &Self::State, _player: usize) -> String {
        "stuck".to_string()
    }
}

/// Three players each pick a coin without seeing the others. Player 0
/// scores +2 when everyone matches and -1 otherwise; the other two split
/// the opposite.
#[derive(Debug, Clone, Copy)]
pub struct ThreeCoins;

impl Game for ThreeCoins {
    type State = MatchingState;
    type Action = Coin;

    fn num_players(&self) -> usize {
        3
    }

    fn initial_state(&self) -> Self::State {
        MatchingState::default()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_terminal(state) {
            return vec![];
        }
        vec![Coin::Heads, Coin::Tails]
    }

    fn apply(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State> {
        if self.is_terminal(state) {
            return Err(CfrError::IllegalAction {
                action: action.label(),
                state: self.describe(state),
            });
        }
        let mut next = state.clone();
        next.choices.push(*action);
        Ok(next)
    }

    fn is_terminal(&self, state: &Self::State) -> bool {
        state.choices.len() == 3
    }

    fn utility(&self, state: &Self::State, player: usize) -> Result<f64> {
        if !self.is_terminal(state) {
            return Err(CfrError::UndefinedUtility {
                state: self.describe(state),
            });
        }
        let all_match = state.choices.iter().all(|&c| c == state.choices[0]);
        let p0 = if all_match { 2.0 } else { -1.0 };
        Ok(if player == 0 { p0 } else { -p0 / 2.0 })
    }

    fn acting_player(&self, state: &Self::State) -> Option<usize> {
        (!self.is_terminal(state)).then_some(state.choices.len())
    }

    fn information_set_key(&self, _state: &Self::State, player: usize) -> String {
        format!("p{}", player)
    }
}
