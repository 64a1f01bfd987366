//! In-memory store backed by lock-guarded maps.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::LabyrinthStore;
use crate::error::{LabyrinthError, LabyrinthResult};
use crate::graph::GraphStructure;
use crate::ids::{EntityId, LabyrinthKey, Turn};
use crate::positions::EntityPositionRecord;

/// History of one labyrinth, ordered by entity then turn.
type History = BTreeMap<(EntityId, Turn), EntityPositionRecord>;

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    labyrinths: RwLock<HashMap<LabyrinthKey, GraphStructure>>,
    positions: RwLock<HashMap<LabyrinthKey, History>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(lock: &RwLock<T>) -> LabyrinthResult<RwLockReadGuard<'_, T>> {
        lock.read()
            .map_err(|_| LabyrinthError::Storage("memory store lock poisoned".into()))
    }

    fn write<T>(lock: &RwLock<T>) -> LabyrinthResult<RwLockWriteGuard<'_, T>> {
        lock.write()
            .map_err(|_| LabyrinthError::Storage("memory store lock poisoned".into()))
    }
}

impl LabyrinthStore for MemoryStore {
    fn get_labyrinth(&self, key: &LabyrinthKey) -> LabyrinthResult<Option<GraphStructure>> {
        Ok(Self::read(&self.labyrinths)?.get(key).cloned())
    }

    fn put_labyrinth(&self, structure: &GraphStructure) -> LabyrinthResult<()> {
        Self::write(&self.labyrinths)?.insert(structure.key().clone(), structure.clone());
        Ok(())
    }

    fn insert_position_record(&self, record: &EntityPositionRecord) -> LabyrinthResult<()> {
        let mut positions = Self::write(&self.positions)?;
        let history = positions.entry(record.key.clone()).or_default();
        let slot = (record.entity_id.clone(), record.turn);
        if history.contains_key(&slot) {
            return Err(LabyrinthError::DuplicateRecord {
                entity: record.entity_id.clone(),
                turn: record.turn,
            });
        }
        history.insert(slot, record.clone());
        Ok(())
    }

    fn query_positions(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        let positions = Self::read(&self.positions)?;
        Ok(positions
            .get(key)
            .map(|history| {
                history
                    .values()
                    .filter(|record| record.turn == turn)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn query_entity_latest_position(
        &self,
        key: &LabyrinthKey,
        entity: &EntityId,
        turn: Turn,
    ) -> LabyrinthResult<Option<EntityPositionRecord>> {
        let positions = Self::read(&self.positions)?;
        Ok(positions.get(key).and_then(|history| {
            history
                .range((entity.clone(), Turn::ZERO)..=(entity.clone(), turn))
                .next_back()
                .map(|(_, record)| record.clone())
        }))
    }

    fn query_positions_as_of(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        let positions = Self::read(&self.positions)?;
        let Some(history) = positions.get(key) else {
            return Ok(Vec::new());
        };

        // Ascending (entity, turn) order: the last record seen per entity wins.
        let mut latest: BTreeMap<&EntityId, &EntityPositionRecord> = BTreeMap::new();
        for ((entity, recorded), record) in history {
            if *recorded <= turn {
                latest.insert(entity, record);
            }
        }
        Ok(latest.into_values().cloned().collect())
    }
}
