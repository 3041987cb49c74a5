//! Configuration options for the CFR solver.
//!
//! [`CfrConfig`] controls the algorithm (which traversal, regret update
//! rules, exploration). [`TrainingConfig`] controls the training run around
//! it: iteration budget, reporting, evaluation and checkpoint schedule.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cfr::error::ConfigError;
use crate::cfr::evaluation::MatchReport;

/// Which traversal the solver runs each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CfrVariant {
    /// Full tree traversal per player per iteration.
    #[default]
    Vanilla,
    /// One sampled trajectory per player per iteration.
    OutcomeSampling,
}

impl std::fmt::Display for CfrVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CfrVariant::Vanilla => write!(f, "vanilla"),
            CfrVariant::OutcomeSampling => write!(f, "outcome-sampling"),
        }
    }
}

/// Configuration for the CFR solver.
///
/// # Example
/// ```
/// use cfr_engine::cfr::{CfrConfig, CfrVariant};
///
/// let config = CfrConfig::default();
/// assert_eq!(config.variant, CfrVariant::Vanilla);
/// assert!(!config.use_cfr_plus);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CfrConfig {
    /// Traversal variant.
    pub variant: CfrVariant,

    /// Floor cumulative regrets at zero after every update (CFR+).
    ///
    /// Off by default: plain CFR keeps negative regrets.
    pub use_cfr_plus: bool,

    /// Weight strategy-sum contributions by the iteration number.
    pub use_linear_averaging: bool,

    /// Skip subtrees that neither the traverser nor the other players can
    /// reach (vanilla only). Nothing below them is updated.
    pub pruning: bool,

    /// Epsilon of the traverser's sampling policy for outcome sampling:
    /// actions are drawn from `epsilon / n + (1 - epsilon) * strategy`.
    pub exploration: f64,

    /// Random seed for reproducibility. `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for CfrConfig {
    fn default() -> Self {
        Self {
            variant: CfrVariant::Vanilla,
            use_cfr_plus: false,
            use_linear_averaging: false,
            pruning: true,
            exploration: 0.6,
            seed: None,
        }
    }
}

impl CfrConfig {
    /// Create a new CfrConfig with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain vanilla CFR with full traversal.
    pub fn vanilla() -> Self {
        Self::default()
    }

    /// Outcome-sampling MCCFR with the default exploration.
    pub fn outcome_sampling() -> Self {
        Self {
            variant: CfrVariant::OutcomeSampling,
            ..Default::default()
        }
    }

    /// Vanilla traversal with CFR+ regret flooring and linear averaging.
    ///
    /// Usually converges in far fewer iterations than plain vanilla CFR.
    pub fn fast() -> Self {
        Self {
            use_cfr_plus: true,
            use_linear_averaging: true,
            ..Default::default()
        }
    }

    /// Builder method: set the traversal variant.
    pub fn with_variant(mut self, variant: CfrVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Builder method: set whether to use CFR+.
    pub fn with_cfr_plus(mut self, enable: bool) -> Self {
        self.use_cfr_plus = enable;
        self
    }

    /// Builder method: set whether to use linear averaging.
    pub fn with_linear_averaging(mut self, enable: bool) -> Self {
        self.use_linear_averaging = enable;
        self
    }

    /// Builder method: set zero-reach pruning.
    pub fn with_pruning(mut self, enable: bool) -> Self {
        self.pruning = enable;
        self
    }

    /// Builder method: set exploration probability.
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Builder method: set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration and return any errors.
    ///
    /// Outcome sampling needs every traverser action to have positive
    /// sampling probability, so exploration must be in `(0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = self.exploration > 0.0 && self.exploration <= 1.0;
        if self.variant == CfrVariant::OutcomeSampling && !in_range {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        if !(0.0..=1.0).contains(&self.exploration) {
            return Err(ConfigError::InvalidExploration(self.exploration));
        }
        Ok(())
    }
}

/// Schedule for one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of iterations to run.
    pub iterations: u64,
    /// Log progress every this many iterations (`None` = only at the end).
    pub report_interval: Option<u64>,
    /// Evaluate against the random baseline every this many iterations.
    pub evaluation_interval: Option<u64>,
    /// Matches per evaluation.
    pub evaluation_games: usize,
    /// Write a checkpoint every this many iterations.
    pub checkpoint_interval: Option<u64>,
    /// Where checkpoints are written.
    pub checkpoint_path: Option<PathBuf>,
    /// Board dimension handed to the tic-tac-toe game by the binary. The
    /// engine itself does not read it.
    pub board_dim: usize,
    /// Algorithm settings.
    pub cfr: CfrConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 1_000,
            report_interval: Some(100),
            evaluation_interval: None,
            evaluation_games: 1_000,
            checkpoint_interval: None,
            checkpoint_path: None,
            board_dim: 3,
            cfr: CfrConfig::default(),
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cfr.validate()?;

        let intervals = [
            ("report_interval", self.report_interval),
            ("evaluation_interval", self.evaluation_interval),
            ("checkpoint_interval", self.checkpoint_interval),
        ];
        for (name, interval) in intervals {
            if interval == Some(0) {
                return Err(ConfigError::ZeroValue(name));
            }
        }

        if self.evaluation_interval.is_some() && self.evaluation_games == 0 {
            return Err(ConfigError::ZeroValue("evaluation_games"));
        }

        if self.checkpoint_interval.is_some() && self.checkpoint_path.is_none() {
            return Err(ConfigError::MissingCheckpointPath);
        }

        Ok(())
    }
}

/// Statistics tracked during CFR training.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CfrStats {
    /// Total number of iterations completed.
    pub iterations: u64,

    /// Number of unique information sets discovered.
    pub info_sets: usize,

    /// Total time spent training (in seconds).
    pub elapsed_seconds: f64,

    /// Iterations per second.
    pub iterations_per_second: f64,

    /// Sum of root values per traversing player across all iterations.
    pub cumulative_utility: Vec<f64>,

    /// Latest convergence indicator, if one has been measured.
    pub convergence: Option<f64>,

    /// Results of scheduled evaluations against the random baseline.
    pub evaluations: Vec<EvaluationPoint>,
}

/// A single evaluation taken at a specific iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPoint {
    /// Iteration number when this evaluation was taken.
    pub iteration: u64,
    /// Match results of the average strategy against the baseline.
    pub report: MatchReport,
}

impl CfrStats {
    /// Create new empty stats for a game with `num_players` players.
    pub fn new(num_players: usize) -> Self {
        Self {
            cumulative_utility: vec![0.0; num_players],
            ..Default::default()
        }
    }

    /// Update iterations per second based on elapsed time.
    pub fn update_rate(&mut self) {
        if self.elapsed_seconds > 0.0 {
            self.iterations_per_second = self.iterations as f64 / self.elapsed_seconds;
        }
    }

    /// Mean root value per iteration for `player`.
    pub fn average_utility(&self, player: usize) -> f64 {
        match (self.cumulative_utility.get(player), self.iterations) {
            (Some(total), n) if n > 0 => total / n as f64,
            _ => 0.0,
        }
    }
}
