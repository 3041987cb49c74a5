//! Playing and measuring strategies.
//!
//! A [`Policy`] maps a decision point to a distribution over its legal
//! actions. On top of that the module provides sampled matches, a seeded
//! parallel evaluation against a baseline, an exact outcome enumeration and
//! a best-response exploitability measure.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cfr::error::{CfrError, Result};
use crate::cfr::game::Game;
use crate::cfr::storage::InfoSetStore;
use crate::cfr::strategy::{argmax, normalize_or_uniform, sample_index, uniform};

/// A (possibly stochastic) way of choosing actions.
pub trait Policy<G: Game>: Sync {
    /// Probability of each of `actions` at `state`, aligned by index.
    fn action_probabilities(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
    ) -> Result<Vec<f64>>;
}

/// Uniformly random legal moves. The baseline opponent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPolicy;

impl<G: Game> Policy<G> for RandomPolicy {
    fn action_probabilities(
        &self,
        _game: &G,
        _state: &G::State,
        actions: &[G::Action],
    ) -> Result<Vec<f64>> {
        Ok(uniform(actions.len()))
    }
}

/// The average strategy held in a store.
///
/// Information sets the store has never seen are played uniformly. Legal
/// actions missing from a stored entry get probability 0 and the remainder
/// is renormalized.
#[derive(Debug, Clone, Copy)]
pub struct AveragePolicy<'a> {
    store: &'a InfoSetStore,
}

impl<'a> AveragePolicy<'a> {
    /// Wrap a trained store.
    pub fn new(store: &'a InfoSetStore) -> Self {
        Self { store }
    }
}

impl<G: Game> Policy<G> for AveragePolicy<'_> {
    fn action_probabilities(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
    ) -> Result<Vec<f64>> {
        let player = game
            .acting_player(state)
            .ok_or_else(|| CfrError::NoActingPlayer {
                state: game.describe(state),
            })?;
        let key = game.information_set_key(state, player);

        let node = match self.store.get(&key) {
            Some(node) => node,
            None => return Ok(uniform(actions.len())),
        };

        let average = node.average_strategy();
        let weights: Vec<f64> = actions
            .iter()
            .map(|action| {
                node.position(&game.action_label(action))
                    .map_or(0.0, |i| average[i])
            })
            .collect();
        Ok(normalize_or_uniform(&weights))
    }
}

/// Always plays the most likely action of the wrapped policy (first one on
/// ties).
#[derive(Debug, Clone, Copy)]
pub struct GreedyPolicy<P> {
    inner: P,
}

impl<P> GreedyPolicy<P> {
    /// Make `inner` deterministic.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<G: Game, P: Policy<G>> Policy<G> for GreedyPolicy<P> {
    fn action_probabilities(
        &self,
        game: &G,
        state: &G::State,
        actions: &[G::Action],
    ) -> Result<Vec<f64>> {
        let probabilities = self.inner.action_probabilities(game, state, actions)?;
        let mut greedy = vec![0.0; actions.len()];
        if let Some(best) = argmax(&probabilities) {
            greedy[best] = 1.0;
        }
        Ok(greedy)
    }
}

/// One played game.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord {
    /// Terminal utility per player.
    pub utilities: Vec<f64>,
    /// Labels of the actions played, in order.
    pub actions: Vec<String>,
}

/// Win/draw/loss tally of a candidate against a baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Matches played.
    pub games: usize,
    /// Matches the candidate won.
    pub wins: usize,
    /// Drawn matches.
    pub draws: usize,
    /// Matches the candidate lost.
    pub losses: usize,
    /// Mean utility of the candidate.
    pub mean_utility: f64,
}

impl MatchReport {
    /// Fraction of matches won.
    pub fn win_rate(&self) -> f64 {
        self.rate(self.wins)
    }

    /// Fraction of matches drawn.
    pub fn draw_rate(&self) -> f64 {
        self.rate(self.draws)
    }

    /// Fraction of matches lost.
    pub fn loss_rate(&self) -> f64 {
        self.rate(self.losses)
    }

    fn rate(&self, count: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            count as f64 / self.games as f64
        }
    }
}

/// Actor, legal actions and the actor's policy distribution at `state`.
fn probabilities_at<G: Game>(
    game: &G,
    policies: &[&dyn Policy<G>],
    state: &G::State,
) -> Result<(usize, Vec<G::Action>, Vec<f64>)> {
    let actor = game
        .acting_player(state)
        .ok_or_else(|| CfrError::NoActingPlayer {
            state: game.describe(state),
        })?;
    let policy = policies
        .get(actor)
        .ok_or(CfrError::MissingPolicy { player: actor })?;

    let actions = game.legal_actions(state);
    if actions.is_empty() {
        return Err(CfrError::NoLegalActions {
            state: game.describe(state),
        });
    }

    let probabilities = policy.action_probabilities(game, state, &actions)?;
    if probabilities.len() != actions.len() {
        return Err(CfrError::ActionMismatch {
            key: game.information_set_key(state, actor),
            expected: actions.len(),
            found: probabilities.len(),
        });
    }
    Ok((actor, actions, probabilities))
}

/// Sample one match with `policies[p]` playing seat `p`.
pub fn play_match<G: Game, R: Rng + ?Sized>(
    game: &G,
    policies: &[&dyn Policy<G>],
    rng: &mut R,
) -> Result<MatchRecord> {
    let mut state = game.initial_state();
    let mut actions_played = Vec::new();

    while !game.is_terminal(&state) {
        let (actor, actions, probabilities) = probabilities_at(game, policies, &state)?;
        let chosen = sample_index(&probabilities, rng).map_err(|source| CfrError::Sampling {
            key: game.information_set_key(&state, actor),
            source,
        })?;
        actions_played.push(game.action_label(&actions[chosen]));
        state = game.apply(&state, &actions[chosen])?;
    }

    let utilities = (0..game.num_players())
        .map(|p| game.utility(&state, p))
        .collect::<Result<Vec<_>>>()?;

    Ok(MatchRecord {
        utilities,
        actions: actions_played,
    })
}

/// Play `games` matches of `candidate` against `baseline`, rotating the
/// candidate through every seat.
///
/// Match `i` uses `StdRng::seed_from_u64(seed + i)`, so the report only
/// depends on the arguments even though matches run in parallel.
pub fn evaluate_against<G: Game>(
    game: &G,
    candidate: &dyn Policy<G>,
    baseline: &dyn Policy<G>,
    games: usize,
    seed: u64,
) -> Result<MatchReport> {
    let num_players = game.num_players();

    let utilities = (0..games)
        .into_par_iter()
        .map(|i| {
            let seat = i % num_players;
            let policies: Vec<&dyn Policy<G>> = (0..num_players)
                .map(|p| if p == seat { candidate } else { baseline })
                .collect();
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            play_match(game, &policies, &mut rng).map(|record| record.utilities[seat])
        })
        .collect::<Result<Vec<f64>>>()?;

    let mut report = MatchReport {
        games,
        ..Default::default()
    };
    for &u in &utilities {
        if u > 0.0 {
            report.wins += 1;
        } else if u < 0.0 {
            report.losses += 1;
        } else {
            report.draws += 1;
        }
    }
    if games > 0 {
        report.mean_utility = utilities.iter().sum::<f64>() / games as f64;
    }

    debug!(
        "evaluation over {} games: {} wins, {} draws, {} losses",
        report.games, report.wins, report.draws, report.losses
    );
    Ok(report)
}

/// Exact distribution over match outcomes for a policy profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeDistribution {
    /// Probability that each player ends with positive utility.
    pub wins: Vec<f64>,
    /// Probability that no player ends with positive utility.
    pub draw: f64,
    /// Expected utility per player.
    pub expected_utility: Vec<f64>,
}

/// Enumerate every trajectory the profile can produce.
///
/// Branches with probability zero are skipped, so greedy profiles cost a
/// single path.
pub fn outcome_distribution<G: Game>(
    game: &G,
    policies: &[&dyn Policy<G>],
) -> Result<OutcomeDistribution> {
    let n = game.num_players();
    let mut dist = OutcomeDistribution {
        wins: vec![0.0; n],
        draw: 0.0,
        expected_utility: vec![0.0; n],
    };
    enumerate(game, policies, &game.initial_state(), 1.0, &mut dist)?;
    Ok(dist)
}

fn enumerate<G: Game>(
    game: &G,
    policies: &[&dyn Policy<G>],
    state: &G::State,
    reach: f64,
    dist: &mut OutcomeDistribution,
) -> Result<()> {
    if game.is_terminal(state) {
        let mut winner = false;
        for p in 0..game.num_players() {
            let u = game.utility(state, p)?;
            dist.expected_utility[p] += reach * u;
            if u > 0.0 {
                dist.wins[p] += reach;
                winner = true;
            }
        }
        if !winner {
            dist.draw += reach;
        }
        return Ok(());
    }

    let (_, actions, probabilities) = probabilities_at(game, policies, state)?;
    for (action, &prob) in actions.iter().zip(&probabilities) {
        if prob == 0.0 {
            continue;
        }
        let next = game.apply(state, action)?;
        enumerate(game, policies, &next, reach * prob, dist)?;
    }
    Ok(())
}

/// Value `exploiter` obtains by best-responding to the average strategy of
/// every other player.
///
/// Each state is treated as its own decision point, so the best responder
/// sees the full state. That is exact for perfect-information games and an
/// upper bound otherwise.
pub fn best_response_value<G: Game>(
    game: &G,
    store: &InfoSetStore,
    exploiter: usize,
) -> Result<f64> {
    let policy = AveragePolicy::new(store);
    best_response(game, &policy, &game.initial_state(), exploiter)
}

fn best_response<G: Game>(
    game: &G,
    policy: &AveragePolicy<'_>,
    state: &G::State,
    exploiter: usize,
) -> Result<f64> {
    if game.is_terminal(state) {
        return game.utility(state, exploiter);
    }

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

    if actor == exploiter {
        let mut best = f64::NEG_INFINITY;
        for action in &actions {
            let next = game.apply(state, action)?;
            best = best.max(best_response(game, policy, &next, exploiter)?);
        }
        Ok(best)
    } else {
        let strategy = policy.action_probabilities(game, state, &actions)?;
        let mut expected = 0.0;
        for (action, &prob) in actions.iter().zip(&strategy) {
            if prob == 0.0 {
                continue;
            }
            let next = game.apply(state, action)?;
            expected += prob * best_response(game, policy, &next, exploiter)?;
        }
        Ok(expected)
    }
}

/// Mean over players of what a best response gains over the average
/// strategy profile. Zero at a Nash equilibrium.
pub fn exploitability<G: Game>(game: &G, store: &InfoSetStore) -> Result<f64> {
    let n = game.num_players();
    let policy = AveragePolicy::new(store);
    let profile: Vec<&dyn Policy<G>> = (0..n).map(|_| &policy as &dyn Policy<G>).collect();
    let on_policy = outcome_distribution(game, &profile)?;

    let mut total = 0.0;
    for player in 0..n {
        total += best_response_value(game, store, player)? - on_policy.expected_utility[player];
    }
    Ok(total / n as f64)
}
