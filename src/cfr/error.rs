//! Error types for the CFR engine.
//!
//! Every fallible engine call returns [`CfrError`]. Errors raised inside a
//! traversal abort the current training iteration and propagate out of the
//! solver's `train*` methods; they indicate a Game Model bug or bad input,
//! never a condition worth retrying.

use std::path::PathBuf;

use rand::distributions::WeightedError;
use thiserror::Error;

/// Errors produced by the engine, game models and checkpoint I/O.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CfrError {
    /// `apply` (or sampling) was given an action that is not legal in the state.
    #[error("illegal action {action} in state {state}")]
    IllegalAction {
        /// Label of the rejected action.
        action: String,
        /// Description of the state it was applied to.
        state: String,
    },

    /// `utility` was queried on a non-terminal state.
    #[error("utility is undefined for non-terminal state {state}")]
    UndefinedUtility {
        /// Description of the offending state.
        state: String,
    },

    /// A non-terminal state reported no acting player.
    #[error("no acting player in non-terminal state {state}")]
    NoActingPlayer {
        /// Description of the offending state.
        state: String,
    },

    /// A non-terminal state reported an empty legal-action sequence.
    #[error("non-terminal state {state} has no legal actions")]
    NoLegalActions {
        /// Description of the offending state.
        state: String,
    },

    /// An update's action count disagrees with the stored information set.
    #[error("information set {key} has {expected} actions, update has {found}")]
    ActionMismatch {
        /// Information set key.
        key: String,
        /// Number of actions stored for the key.
        expected: usize,
        /// Number of actions supplied by the caller.
        found: usize,
    },

    /// The game listed an information set's actions differently from the
    /// stored entry.
    #[error("information set {key} stores actions [{expected}], game lists [{found}]")]
    ActionOrderMismatch {
        /// Information set key.
        key: String,
        /// Stored action labels, comma separated.
        expected: String,
        /// Labels listed by the game, comma separated.
        found: String,
    },

    /// A strategy weight below zero was accumulated.
    #[error("strategy weight {weight} for information set {key} is negative")]
    NegativeWeight {
        /// Information set key.
        key: String,
        /// The rejected weight.
        weight: f64,
    },

    /// The sampling distribution at a node was degenerate.
    #[error("cannot sample an action at information set {key}: {source}")]
    Sampling {
        /// Information set key.
        key: String,
        /// Underlying distribution error.
        #[source]
        source: WeightedError,
    },

    /// A match was started without a policy for every seat.
    #[error("no policy supplied for player {player}")]
    MissingPolicy {
        /// Seat without a policy.
        player: usize,
    },

    /// A board string could not be parsed.
    #[error("invalid board '{board}': {reason}")]
    InvalidBoard {
        /// The rejected input.
        board: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Invalid solver or training configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem failure while reading or writing an artifact.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        /// What was being attempted ("write checkpoint", ...).
        operation: &'static str,
        /// File involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A checkpoint was produced for another game or format.
    #[error("incompatible checkpoint: {reason}")]
    IncompatibleCheckpoint {
        /// Why it was rejected.
        reason: String,
    },
}

/// Errors that can occur when validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// Exploration probability is out of range.
    #[error("exploration probability {0} is out of range (0, 1]")]
    InvalidExploration(f64),

    /// An interval or count that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    /// Checkpointing was scheduled without a destination.
    #[error("checkpoint_interval is set but checkpoint_path is missing")]
    MissingCheckpointPath,

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(String),

    /// The configuration file could not be parsed.
    #[error("failed to parse config: {0}")]
    Parse(String),
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, CfrError>;
