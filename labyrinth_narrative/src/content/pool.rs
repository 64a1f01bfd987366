//! Tile description pools.

use labyrinth_rules::TileId;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Sentence used when a tile has no description variants at all.
pub const FALLBACK_DESCRIPTION: &str = "You see nothing remarkable.";

static SHARED_POOL: OnceLock<Arc<TileDescriptionPool>> = OnceLock::new();

/// Errors raised while loading description content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid content: {0}")]
    Parse(#[from] toml::de::Error),

    /// The process-wide pool can only be installed once.
    #[error("a shared description pool is already installed")]
    AlreadyInstalled,
}

/// Candidate descriptions per tile, plus a default pool for tiles without their own.
///
/// Loaded once from content configuration and never mutated afterwards.
///
/// ```toml
/// default = ["A damp corridor.", "Dust hangs in the air."]
///
/// [tiles]
/// A = ["The entrance hall echoes with your footsteps."]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDescriptionPool {
    #[serde(default)]
    default: Vec<String>,
    #[serde(default)]
    tiles: HashMap<TileId, Vec<String>>,
}

impl TileDescriptionPool {
    /// An empty pool: every tile falls back to [`FALLBACK_DESCRIPTION`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock descriptions shipped with the game.
    pub fn builtin() -> Self {
        Self::new().with_default([
            "The corridor is dimly lit, shadows dancing on the walls.",
            "You find yourself in a narrow passageway, quiet and still.",
            "A cold, metallic scent fills the air, hinting at recent events.",
        ])
    }

    /// Parse a pool from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ContentError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a pool from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Set the default pool.
    pub fn with_default<S: Into<String>>(mut self, variants: impl IntoIterator<Item = S>) -> Self {
        self.default = variants.into_iter().map(Into::into).collect();
        self
    }

    /// Set the variants for one tile.
    pub fn with_tile<S: Into<String>>(
        mut self,
        tile: impl Into<TileId>,
        variants: impl IntoIterator<Item = S>,
    ) -> Self {
        self.tiles
            .insert(tile.into(), variants.into_iter().map(Into::into).collect());
        self
    }

    /// Variants for a tile: its own entry when present, otherwise the default pool.
    ///
    /// A tile listed with an empty entry has no variants; it does not inherit
    /// the default pool.
    pub fn variants(&self, tile: &TileId) -> &[String] {
        self.tiles.get(tile).unwrap_or(&self.default)
    }

    /// Pick one variant uniformly at random, or the fallback sentence.
    pub fn choose<'a, R: Rng + ?Sized>(&'a self, tile: &TileId, rng: &mut R) -> &'a str {
        self.variants(tile)
            .choose(rng)
            .map(String::as_str)
            .unwrap_or(FALLBACK_DESCRIPTION)
    }
}

/// Install the process-wide pool. Fails if one was already installed or read.
pub fn install_shared_pool(pool: TileDescriptionPool) -> Result<Arc<TileDescriptionPool>, ContentError> {
    let pool = Arc::new(pool);
    SHARED_POOL
        .set(Arc::clone(&pool))
        .map_err(|_| ContentError::AlreadyInstalled)?;
    Ok(pool)
}

/// The process-wide pool; the built-in pool if none was installed first.
pub fn shared_pool() -> Arc<TileDescriptionPool> {
    Arc::clone(SHARED_POOL.get_or_init(|| Arc::new(TileDescriptionPool::builtin())))
}
