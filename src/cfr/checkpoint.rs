//! Trained-strategy artifacts.
//!
//! A checkpoint is everything needed to continue training or to play the
//! trained average strategy: the store snapshot, the iteration count, the
//! solver settings and the statistics so far. It is written as JSON.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::cfr::config::{CfrConfig, CfrStats, CfrVariant};
use crate::cfr::error::{CfrError, Result};
use crate::cfr::storage::{InfoSetStore, StoreSnapshot};

/// Version written into new checkpoints.
pub const FORMAT_VERSION: u32 = 1;

/// Serializable solver state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Layout version of this file.
    pub format_version: u32,
    /// [`Game::name`](crate::cfr::Game::name) of the game it was trained on.
    pub game: String,
    /// Traversal variant used.
    pub variant: CfrVariant,
    /// Completed iterations.
    pub iteration: u64,
    /// Solver settings.
    pub config: CfrConfig,
    /// Regret and strategy tables, sorted by key.
    pub store: StoreSnapshot,
    /// Training statistics.
    pub stats: CfrStats,
}

impl Checkpoint {
    /// Write the checkpoint to `path`.
    ///
    /// The data goes to a sibling temporary file first and is renamed into
    /// place, so an interrupted write never truncates an older checkpoint.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let tmp = path.with_extension("tmp");

        let file = File::create(&tmp).map_err(|source| CfrError::Io {
            operation: "create checkpoint",
            path: tmp.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|source| CfrError::Io {
            operation: "write checkpoint",
            path: tmp.clone(),
            source,
        })?;
        drop(writer);

        fs::rename(&tmp, path).map_err(|source| CfrError::Io {
            operation: "move checkpoint into place at",
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Saved checkpoint at iteration {} ({} info sets) to {}",
            self.iteration,
            self.store.nodes.len(),
            path.display()
        );
        Ok(())
    }

    /// Read a checkpoint written by [`save_json`](Self::save_json).
    ///
    /// # Errors
    /// [`CfrError::IncompatibleCheckpoint`] for an unknown format version.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CfrError::Io {
            operation: "open checkpoint",
            path: path.to_path_buf(),
            source,
        })?;
        let checkpoint: Self = serde_json::from_reader(BufReader::new(file))?;

        if checkpoint.format_version != FORMAT_VERSION {
            return Err(CfrError::IncompatibleCheckpoint {
                reason: format!(
                    "format version {} (expected {})",
                    checkpoint.format_version, FORMAT_VERSION
                ),
            });
        }

        info!(
            "Loaded checkpoint for {} at iteration {} from {}",
            checkpoint.game,
            checkpoint.iteration,
            path.display()
        );
        Ok(checkpoint)
    }

    /// Check that the checkpoint was trained on the game named `game`.
    pub fn ensure_game(&self, game: &str) -> Result<()> {
        if self.game != game {
            return Err(CfrError::IncompatibleCheckpoint {
                reason: format!("trained on {}, not {}", self.game, game),
            });
        }
        Ok(())
    }

    /// Rebuild the information set store.
    pub fn to_store(&self) -> InfoSetStore {
        let mut store = InfoSetStore::with_capacity(self.store.nodes.len());
        store.import(self.store.clone());
        store
    }
}
