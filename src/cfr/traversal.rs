//! Shared traversal seam for the CFR variants.
//!
//! Both variants walk the same external state machine: the solver is idle
//! between calls to [`Traversal::traverse`], the recursion is traversing a
//! node while a call is active, and every branch bottoms out at a terminal
//! utility. They differ only in whether a node expands every legal action
//! (vanilla) or one sampled action (outcome sampling).

use crate::cfr::error::{CfrError, Result};
use crate::cfr::game::Game;
use crate::cfr::storage::InfoSetStore;

/// One CFR pass from the root for one traversing player.
pub trait Traversal {
    /// Run a traversal for `traverser` and return its root value estimate.
    ///
    /// `iteration` is the 1-based solver iteration, used for linear
    /// averaging.
    fn traverse<G: Game>(
        &mut self,
        game: &G,
        store: &mut InfoSetStore,
        traverser: usize,
        iteration: u64,
    ) -> Result<f64>;
}

/// A non-terminal node ready to be expanded.
#[derive(Debug)]
pub(crate) struct Decision<A> {
    pub actor: usize,
    pub actions: Vec<A>,
    pub key: String,
    pub strategy: Vec<f64>,
}

/// Resolve acting player, legal actions, information set and current
/// strategy at a non-terminal state, creating the store entry on first
/// visit.
pub(crate) fn decision<G: Game>(
    game: &G,
    store: &mut InfoSetStore,
    state: &G::State,
) -> Result<Decision<G::Action>> {
    let actor = game
        .acting_player(state)
        .ok_or_else(|| CfrError::NoActingPlayer {
            state: game.describe(state),
        })?;

    let actions = game.legal_actions(state);
    if actions.is_empty() {
        return Err(CfrError::NoLegalActions {
            state: game.describe(state),
        });
    }

    let key = game.information_set_key(state, actor);
    let labels: Vec<String> = actions.iter().map(|a| game.action_label(a)).collect();
    let strategy = match store.get(&key) {
        Some(node) if node.len() != labels.len() => {
            return Err(CfrError::ActionMismatch {
                key,
                expected: node.len(),
                found: labels.len(),
            })
        }
        // Regrets are indexed by position, so the order must match too.
        Some(node) if node.actions() != labels.as_slice() => {
            return Err(CfrError::ActionOrderMismatch {
                key,
                expected: node.actions().join(","),
                found: labels.join(","),
            })
        }
        Some(node) => node.current_strategy(),
        None => store.get_or_create(&key, &labels).current_strategy(),
    };

    Ok(Decision {
        actor,
        actions,
        key,
        strategy,
    })
}

/// Strategy-sum weight for a visit with the given own-reach.
pub(crate) fn averaging_weight(reach: f64, iteration: u64, linear: bool) -> f64 {
    if linear {
        reach * iteration as f64
    } else {
        reach
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::test_games::Matching;

    #[test]
    fn test_decision_creates_node_once() {
        let game = Matching;
        let mut store = InfoSetStore::new();
        let root = game.initial_state();

        let first = decision(&game, &mut store, &root).unwrap();
        assert_eq!(first.actor, 0);
        assert_eq!(first.key, "p0");
        assert_eq!(first.strategy, vec![0.5, 0.5]);

        decision(&game, &mut store, &root).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_decision_rejects_reordered_actions() {
        let game = Matching;
        let mut store = InfoSetStore::new();
        store.get_or_create("p0", &["t".to_string(), "h".to_string()]);

        let err = decision(&game, &mut store, &game.initial_state()).unwrap_err();
        assert!(matches!(err, CfrError::ActionOrderMismatch { .. }), "{}", err);

        let mut store = InfoSetStore::new();
        store.get_or_create("p0", &["h".to_string()]);
        let err = decision(&game, &mut store, &game.initial_state()).unwrap_err();
        assert!(matches!(err, CfrError::ActionMismatch { expected: 1, found: 2, .. }));
    }
}
