//! Service configuration.

use labyrinth_rules::{LabyrinthError, StorageConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::content::{shared_pool, ContentError, TileDescriptionPool};

/// Errors raised while loading configuration or opening what it names.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("failed to open storage: {0}")]
    Storage(#[from] LabyrinthError),
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Top-level configuration for a labyrinth service.
///
/// ```toml
/// request_timeout_ms = 2000
/// log_filter = "info"
///
/// [storage]
/// backend = "sled"
/// path = "data/labyrinth"
///
/// [narrative]
/// rng_seed = 42
/// content_path = "content/tiles.toml"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    /// Default deadline for storage-backed operations. None = unbounded.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub narrative: NarrativeConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            request_timeout_ms: None,
            log_filter: default_log_filter(),
            narrative: NarrativeConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a file, or the defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    /// Install the global subscriber with `log_filter` as the fallback filter.
    ///
    /// Returns `false` if a subscriber was already installed.
    pub fn init_logging(&self) -> bool {
        crate::logging::init_logging(&self.log_filter)
    }
}

/// Narrative settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NarrativeConfig {
    /// Fixed seed for description choice; fresh entropy when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Content file for the description pool; the shared pool when absent.
    #[serde(default)]
    pub content_path: Option<PathBuf>,
}

impl NarrativeConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        match self.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    pub fn pool(&self) -> Result<Arc<TileDescriptionPool>, ContentError> {
        match &self.content_path {
            Some(path) => Ok(Arc::new(TileDescriptionPool::load(path)?)),
            None => Ok(shared_pool()),
        }
    }
}
