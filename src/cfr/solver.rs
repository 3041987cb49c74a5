//! Training driver.
//!
//! [`CfrSolver`] owns the game, the information set store and the selected
//! traversal engine, and runs iterations: one traversal per player per
//! iteration, alternating the traversing player. Around that loop it keeps
//! statistics, evaluates against a random baseline and writes checkpoints
//! on a [`TrainingConfig`] schedule.

use std::time::Instant;

use log::{info, warn};

use crate::cfr::checkpoint::{Checkpoint, FORMAT_VERSION};
use crate::cfr::config::{CfrConfig, CfrStats, CfrVariant, EvaluationPoint, TrainingConfig};
use crate::cfr::error::{CfrError, ConfigError, Result};
use crate::cfr::evaluation::{self, AveragePolicy, MatchReport, RandomPolicy};
use crate::cfr::game::Game;
use crate::cfr::outcome_sampling::OutcomeSamplingCfr;
use crate::cfr::storage::InfoSetStore;
use crate::cfr::traversal::Traversal;
use crate::cfr::vanilla::VanillaCfr;

/// The traversal selected by [`CfrConfig::variant`].
#[derive(Debug, Clone)]
enum Engine {
    Vanilla(VanillaCfr),
    OutcomeSampling(OutcomeSamplingCfr),
}

impl Engine {
    fn new(config: &CfrConfig) -> Self {
        match config.variant {
            CfrVariant::Vanilla => Engine::Vanilla(VanillaCfr::new(config)),
            CfrVariant::OutcomeSampling => Engine::OutcomeSampling(OutcomeSamplingCfr::new(config)),
        }
    }

    fn traverse<G: Game>(
        &mut self,
        game: &G,
        store: &mut InfoSetStore,
        traverser: usize,
        iteration: u64,
    ) -> Result<f64> {
        match self {
            Engine::Vanilla(engine) => engine.traverse(game, store, traverser, iteration),
            Engine::OutcomeSampling(engine) => engine.traverse(game, store, traverser, iteration),
        }
    }
}

/// The main CFR solver.
///
/// # Example
/// ```
/// use cfr_engine::cfr::{CfrConfig, CfrSolver};
/// use cfr_engine::games::tictactoe::TicTacToe;
///
/// let mut solver = CfrSolver::new(TicTacToe::new(2), CfrConfig::vanilla()).unwrap();
/// solver.train(10).unwrap();
/// assert_eq!(solver.iteration(), 10);
/// assert!(solver.average_strategy("----").is_some());
/// ```
#[derive(Debug, Clone)]
pub struct CfrSolver<G: Game> {
    /// The game being solved.
    game: G,

    /// Configuration for the solver.
    config: CfrConfig,

    /// Regrets and strategy sums.
    store: InfoSetStore,

    /// Traversal engine, including its sampler state.
    engine: Engine,

    /// Completed iterations.
    iteration: u64,

    /// Statistics tracking.
    stats: CfrStats,
}

impl<G: Game> CfrSolver<G> {
    /// Create a new solver for `game`.
    ///
    /// # Errors
    /// [`CfrError::Config`] if `config` fails validation.
    pub fn new(game: G, config: CfrConfig) -> Result<Self> {
        Self::with_capacity(game, config, 0)
    }

    /// Create a solver with pre-allocated storage capacity.
    pub fn with_capacity(game: G, config: CfrConfig, capacity: usize) -> Result<Self> {
        config.validate()?;
        let stats = CfrStats::new(game.num_players());
        Ok(Self {
            engine: Engine::new(&config),
            store: InfoSetStore::with_capacity(capacity),
            game,
            config,
            iteration: 0,
            stats,
        })
    }

    /// Create a solver for `game` and load `checkpoint` into it, using the
    /// settings stored in the checkpoint.
    pub fn from_checkpoint(game: G, checkpoint: Checkpoint) -> Result<Self> {
        let mut solver = Self::new(game, checkpoint.config.clone())?;
        solver.resume(checkpoint)?;
        Ok(solver)
    }

    /// Run one iteration: a traversal per player.
    ///
    /// An error aborts the iteration without counting it; the store may
    /// hold the partial updates of the failed traversal.
    pub fn run_iteration(&mut self) -> Result<()> {
        let iteration = self.iteration + 1;

        let mut values = Vec::with_capacity(self.game.num_players());
        for player in 0..self.game.num_players() {
            values.push(
                self.engine
                    .traverse(&self.game, &mut self.store, player, iteration)?,
            );
        }

        for (total, value) in self.stats.cumulative_utility.iter_mut().zip(values) {
            *total += value;
        }
        self.iteration = iteration;
        self.stats.iterations = iteration;
        Ok(())
    }

    /// Train the solver for `iterations` iterations.
    pub fn train(&mut self, iterations: u64) -> Result<&CfrStats> {
        let start_time = Instant::now();
        let base_seconds = self.stats.elapsed_seconds;

        for _ in 0..iterations {
            self.run_iteration()?;
        }

        self.refresh_stats(base_seconds, &start_time);
        Ok(&self.stats)
    }

    /// Train with a callback for progress tracking.
    ///
    /// `callback` runs every `callback_interval` iterations with the
    /// up-to-date statistics and store.
    pub fn train_with_callback<F>(
        &mut self,
        iterations: u64,
        callback_interval: u64,
        mut callback: F,
    ) -> Result<&CfrStats>
    where
        F: FnMut(&CfrStats, &InfoSetStore),
    {
        if callback_interval == 0 {
            return Err(ConfigError::ZeroValue("callback_interval").into());
        }
        let start_time = Instant::now();
        let base_seconds = self.stats.elapsed_seconds;

        for i in 0..iterations {
            self.run_iteration()?;

            if (i + 1) % callback_interval == 0 {
                self.refresh_stats(base_seconds, &start_time);
                callback(&self.stats, &self.store);
            }
        }

        self.refresh_stats(base_seconds, &start_time);
        Ok(&self.stats)
    }

    /// Run `schedule.iterations` iterations with its reporting, evaluation
    /// and checkpoint intervals.
    pub fn train_with_schedule(&mut self, schedule: &TrainingConfig) -> Result<&CfrStats> {
        self.train_with_progress(schedule, |_| {})
    }

    /// [`train_with_schedule`](Self::train_with_schedule), calling
    /// `on_iteration` after every iteration (for progress bars).
    pub fn train_with_progress<F>(
        &mut self,
        schedule: &TrainingConfig,
        mut on_iteration: F,
    ) -> Result<&CfrStats>
    where
        F: FnMut(&CfrStats),
    {
        schedule.validate()?;

        info!(
            "Training {} CFR for {} iterations (cfr+: {}, linear averaging: {}, starting at {})",
            self.config.variant,
            schedule.iterations,
            self.config.use_cfr_plus,
            self.config.use_linear_averaging,
            self.iteration
        );

        let start_time = Instant::now();
        let base_seconds = self.stats.elapsed_seconds;
        let mut snapshot = self.store.snapshot_strategies();

        for i in 1..=schedule.iterations {
            self.run_iteration()?;
            on_iteration(&self.stats);

            if due(schedule.report_interval, i) {
                self.refresh_stats(base_seconds, &start_time);
                let ci = self.store.convergence_indicator(&snapshot);
                self.stats.convergence = Some(ci);
                snapshot = self.store.snapshot_strategies();
                info!(
                    "Iteration {}: {} info sets, {:.1} it/s, CI {:.3}",
                    self.iteration, self.stats.info_sets, self.stats.iterations_per_second, ci
                );
            }

            if due(schedule.evaluation_interval, i) {
                let seed = self.config.seed.unwrap_or(0).wrapping_add(self.iteration);
                let report = self.evaluate(schedule.evaluation_games, seed)?;
                info!(
                    "Iteration {}: vs random {:.1}% won, {:.1}% drawn, {:.1}% lost",
                    self.iteration,
                    100.0 * report.win_rate(),
                    100.0 * report.draw_rate(),
                    100.0 * report.loss_rate()
                );
                self.stats.evaluations.push(EvaluationPoint {
                    iteration: self.iteration,
                    report,
                });
            }

            if due(schedule.checkpoint_interval, i) {
                if let Some(path) = &schedule.checkpoint_path {
                    self.refresh_stats(base_seconds, &start_time);
                    self.checkpoint().save_json(path)?;
                }
            }
        }

        self.refresh_stats(base_seconds, &start_time);
        info!(
            "Finished at iteration {}: {} info sets in {:.2}s ({:.1} it/s)",
            self.iteration,
            self.stats.info_sets,
            self.stats.elapsed_seconds,
            self.stats.iterations_per_second
        );
        Ok(&self.stats)
    }

    fn refresh_stats(&mut self, base_seconds: f64, start_time: &Instant) {
        self.stats.iterations = self.iteration;
        self.stats.info_sets = self.store.len();
        self.stats.elapsed_seconds = base_seconds + start_time.elapsed().as_secs_f64();
        self.stats.update_rate();
    }

    /// Play the average strategy against uniform random moves.
    pub fn evaluate(&self, games: usize, seed: u64) -> Result<MatchReport> {
        let candidate = AveragePolicy::new(&self.store);
        evaluation::evaluate_against(&self.game, &candidate, &RandomPolicy, games, seed)
    }

    /// Current (regret-matching) strategy at `key`.
    pub fn current_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.store.current_strategy(key)
    }

    /// Average strategy at `key`.
    pub fn average_strategy(&self, key: &str) -> Option<Vec<f64>> {
        self.store.average_strategy(key)
    }

    /// The average strategy as a playable policy.
    pub fn average_policy(&self) -> AveragePolicy<'_> {
        AveragePolicy::new(&self.store)
    }

    /// Exploitability of the average strategy.
    ///
    /// The best response sees full states, so this is exact for
    /// perfect-information games only.
    pub fn exploitability(&self) -> Result<f64> {
        evaluation::exploitability(&self.game, &self.store)
    }

    /// Get the current iteration count.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Get the number of information sets discovered.
    pub fn num_info_sets(&self) -> usize {
        self.store.len()
    }

    /// Get training statistics.
    pub fn stats(&self) -> &CfrStats {
        &self.stats
    }

    /// Get a reference to the store.
    pub fn store(&self) -> &InfoSetStore {
        &self.store
    }

    /// Get a reference to the game.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Get the configuration.
    pub fn config(&self) -> &CfrConfig {
        &self.config
    }

    /// All discovered information set keys, sorted.
    pub fn info_set_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.store.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Export solver state for checkpointing.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            format_version: FORMAT_VERSION,
            game: self.game.name(),
            variant: self.config.variant,
            iteration: self.iteration,
            config: self.config.clone(),
            store: self.store.export(),
            stats: self.stats.clone(),
        }
    }

    /// Continue from `checkpoint`.
    ///
    /// The solver keeps its own configuration. The outcome-sampling RNG is
    /// reseeded from the configured seed and the checkpoint's iteration, so
    /// a resumed seeded run is reproducible.
    pub fn resume(&mut self, checkpoint: Checkpoint) -> Result<()> {
        checkpoint.ensure_game(&self.game.name())?;
        if checkpoint.stats.cumulative_utility.len() != self.game.num_players() {
            return Err(CfrError::IncompatibleCheckpoint {
                reason: format!(
                    "{} players recorded, game has {}",
                    checkpoint.stats.cumulative_utility.len(),
                    self.game.num_players()
                ),
            });
        }
        if checkpoint.variant != self.config.variant {
            warn!(
                "Checkpoint was trained with {} CFR, continuing with {}",
                checkpoint.variant, self.config.variant
            );
        }

        self.store.import(checkpoint.store);
        self.iteration = checkpoint.iteration;
        self.stats = checkpoint.stats;

        let mut engine_config = self.config.clone();
        engine_config.seed = engine_config.seed.map(|s| s.wrapping_add(self.iteration));
        self.engine = Engine::new(&engine_config);

        info!(
            "Resumed at iteration {} with {} info sets",
            self.iteration,
            self.store.len()
        );
        Ok(())
    }

    /// Reset the solver to its initial state.
    pub fn reset(&mut self) {
        self.store.clear();
        self.iteration = 0;
        self.stats = CfrStats::new(self.game.num_players());
        self.engine = Engine::new(&self.config);
    }
}

fn due(interval: Option<u64>, i: u64) -> bool {
    matches!(interval, Some(n) if i % n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfr::test_games::{Forced, Matching, Stuck};

    #[test]
    fn test_rejects_invalid_config() {
        let config = CfrConfig::outcome_sampling().with_exploration(0.0);
        let err = CfrSolver::new(Matching, config).unwrap_err();
        assert!(matches!(
            err,
            CfrError::Config(ConfigError::InvalidExploration(_))
        ));
    }

    #[test]
    fn test_train_counts_iterations() {
        let mut solver = CfrSolver::new(Matching, CfrConfig::vanilla()).unwrap();
        let stats = solver.train(25).unwrap();
        assert_eq!(stats.iterations, 25);
        assert_eq!(stats.info_sets, 2);
        assert_eq!(solver.iteration(), 25);
        assert_eq!(solver.info_set_keys(), vec!["p0", "p1"]);

        // Uniform is already an equilibrium of matching pennies.
        assert_eq!(solver.average_strategy("p0").unwrap(), vec![0.5, 0.5]);
        assert_eq!(solver.stats().average_utility(0), 0.0);
    }

    #[test]
    fn test_errors_propagate_out_of_train() {
        let mut solver = CfrSolver::new(Stuck, CfrConfig::vanilla()).unwrap();
        let err = solver.train(1).unwrap_err();
        assert!(matches!(err, CfrError::NoLegalActions { .. }));

        // The failed iteration is not counted.
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.stats().iterations, 0);
        assert!(solver.run_iteration().is_err());
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.stats().cumulative_utility, vec![0.0, 0.0]);
    }

    #[test]
    fn test_train_with_callback() {
        let mut solver = CfrSolver::new(Forced, CfrConfig::vanilla()).unwrap();
        let mut seen = Vec::new();
        solver
            .train_with_callback(10, 3, |stats, store| {
                seen.push((stats.iterations, store.len()));
            })
            .unwrap();
        assert_eq!(seen, vec![(3, 1), (6, 1), (9, 1)]);
        assert_eq!(solver.stats().average_utility(0), 1.0);
        assert_eq!(solver.stats().average_utility(1), -1.0);

        assert!(solver.train_with_callback(1, 0, |_, _| {}).is_err());
    }

    #[test]
    fn test_schedule_evaluates_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forced.json");
        let schedule = TrainingConfig {
            iterations: 6,
            report_interval: Some(2),
            evaluation_interval: Some(3),
            evaluation_games: 8,
            checkpoint_interval: Some(4),
            checkpoint_path: Some(path.clone()),
            ..Default::default()
        };

        let mut solver = CfrSolver::new(Forced, CfrConfig::vanilla().with_seed(1)).unwrap();
        let stats = solver.train_with_schedule(&schedule).unwrap();
        assert_eq!(stats.evaluations.len(), 2);
        assert_eq!(stats.evaluations[1].iteration, 6);
        assert_eq!(stats.evaluations[0].report.wins, 4);
        assert!(stats.convergence.is_some());

        let saved = Checkpoint::load_json(&path).unwrap();
        assert_eq!(saved.iteration, 4);
    }

    #[test]
    fn test_checkpoint_resume_reset() {
        let config = CfrConfig::outcome_sampling().with_seed(9);
        let mut solver = CfrSolver::new(Matching, config.clone()).unwrap();
        solver.train(40).unwrap();

        let checkpoint = solver.checkpoint();
        assert_eq!(checkpoint.game, Matching.name());
        let restored = CfrSolver::from_checkpoint(Matching, checkpoint.clone()).unwrap();
        assert_eq!(restored.iteration(), 40);
        assert_eq!(restored.store(), solver.store());

        // Resumed seeded runs continue identically.
        let mut a = CfrSolver::from_checkpoint(Matching, checkpoint.clone()).unwrap();
        let mut b = CfrSolver::from_checkpoint(Matching, checkpoint).unwrap();
        a.train(20).unwrap();
        b.train(20).unwrap();
        assert_eq!(a.store().export(), b.store().export());

        let mut forced = CfrSolver::new(Forced, CfrConfig::vanilla()).unwrap();
        let err = forced.resume(solver.checkpoint()).unwrap_err();
        assert!(matches!(err, CfrError::IncompatibleCheckpoint { .. }));

        solver.reset();
        assert_eq!(solver.iteration(), 0);
        assert_eq!(solver.num_info_sets(), 0);
        assert_eq!(solver.stats().cumulative_utility, vec![0.0, 0.0]);
    }

    #[test]
    fn test_exploitability_of_forced_game() {
        let mut solver = CfrSolver::new(Forced, CfrConfig::fast()).unwrap();
        solver.train(3).unwrap();
        assert_eq!(solver.exploitability().unwrap(), 0.0);
    }
}
