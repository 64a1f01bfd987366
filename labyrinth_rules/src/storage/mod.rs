//! Storage contract for labyrinth state, with in-memory and sled backends.

mod memory;
mod sled_store;

pub use memory::*;
pub use sled_store::*;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::LabyrinthResult;
use crate::graph::GraphStructure;
use crate::ids::{EntityId, LabyrinthKey, Turn};
use crate::positions::EntityPositionRecord;

/// Persistent storage for labyrinth structures and position history.
///
/// Implementations must be thread-safe and durable on success. Every write
/// is all-or-nothing: `put_labyrinth` replaces the whole structure, and
/// `insert_position_record` either stores the record or fails.
pub trait LabyrinthStore: Send + Sync {
    /// Fetch the structure for a scope, or `None` when absent.
    fn get_labyrinth(&self, key: &LabyrinthKey) -> LabyrinthResult<Option<GraphStructure>>;

    /// Store a structure, replacing any previous one for the same scope.
    fn put_labyrinth(&self, structure: &GraphStructure) -> LabyrinthResult<()>;

    /// Insert a record; fails with `DuplicateRecord` if `(entity, turn)` exists.
    fn insert_position_record(&self, record: &EntityPositionRecord) -> LabyrinthResult<()>;

    /// All records of exactly `turn`, ordered by entity ID.
    fn query_positions(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>>;

    /// The entity's record with the highest turn at or before `turn`.
    fn query_entity_latest_position(
        &self,
        key: &LabyrinthKey,
        entity: &EntityId,
        turn: Turn,
    ) -> LabyrinthResult<Option<EntityPositionRecord>>;

    /// The latest record at or before `turn` for every entity, ordered by entity ID.
    fn query_positions_as_of(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>>;
}

/// Which storage backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Process-local maps; contents vanish with the process.
    #[default]
    Memory,
    /// Embedded sled database at `path`.
    Sled { path: PathBuf },
}

impl StorageConfig {
    /// Open the configured backend.
    pub fn open(&self) -> LabyrinthResult<Arc<dyn LabyrinthStore>> {
        Ok(match self {
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
            StorageConfig::Sled { path } => Arc::new(SledStore::open(path)?),
        })
    }
}
