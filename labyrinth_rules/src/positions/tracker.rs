//! Entity position tracker - records and queries position history for one labyrinth.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use super::{EntityPositionRecord, EntityType};
use crate::deadline::Deadline;
use crate::error::{LabyrinthError, LabyrinthResult};
use crate::ids::{EntityId, LabyrinthKey, TileId, Turn};
use crate::storage::LabyrinthStore;

/// Append-only ledger of entity positions within one (session, labyrinth) scope.
///
/// Recording is serialized per entity: two calls for the same entity never
/// interleave, while different entities record concurrently.
///
/// # Re-recording policy
///
/// A second record for the same `(entity, turn)` is rejected with
/// `DuplicateRecord`, and a turn lower than the entity's latest recorded turn
/// is rejected with `TurnRegression`. History is never rewritten.
pub struct EntityPositionTracker {
    key: LabyrinthKey,
    store: Arc<dyn LabyrinthStore>,
    /// One lock per entity with a record in flight; released afterwards.
    entity_locks: Mutex<HashMap<EntityId, Arc<Mutex<()>>>>,
}

impl EntityPositionTracker {
    pub fn new(key: LabyrinthKey, store: Arc<dyn LabyrinthStore>) -> Self {
        Self {
            key,
            store,
            entity_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn key(&self) -> &LabyrinthKey {
        &self.key
    }

    /// Append a position record for `entity` at `turn`.
    pub fn record_position(
        &self,
        turn: Turn,
        entity: EntityId,
        entity_type: EntityType,
        tile: TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<EntityPositionRecord> {
        let entity_lock = self.entity_lock(&entity)?;
        let result = match entity_lock.lock() {
            Ok(_guard) => self.append(turn, entity.clone(), entity_type, tile, deadline),
            Err(_) => Err(LabyrinthError::Storage("entity lock poisoned".into())),
        };
        self.release_entity_lock(&entity, entity_lock);
        result
    }

    fn append(
        &self,
        turn: Turn,
        entity: EntityId,
        entity_type: EntityType,
        tile: TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<EntityPositionRecord> {
        deadline.check()?;
        let latest = self
            .store
            .query_entity_latest_position(&self.key, &entity, Turn(u64::MAX))?;
        if let Some(latest) = latest {
            if latest.turn == turn {
                return Err(LabyrinthError::DuplicateRecord { entity, turn });
            }
            if latest.turn > turn {
                return Err(LabyrinthError::TurnRegression {
                    entity,
                    turn,
                    latest: latest.turn,
                });
            }
        }

        let record = EntityPositionRecord::new(self.key.clone(), turn, entity, entity_type, tile);
        deadline.check()?;
        self.store.insert_position_record(&record)?;

        debug!(
            labyrinth = %self.key,
            entity = %record.entity_id,
            turn = %record.turn,
            tile = %record.tile_id,
            "recorded position"
        );
        Ok(record)
    }

    /// All records for exactly `turn`. Empty when nobody moved that turn.
    pub fn positions_at_turn(
        &self,
        turn: Turn,
        deadline: &Deadline,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        deadline.check()?;
        self.store.query_positions(&self.key, turn)
    }

    /// Where `entity` was as of `turn`: its record with the highest turn `<= turn`.
    pub fn latest_position_before_or_at(
        &self,
        turn: Turn,
        entity: &EntityId,
        deadline: &Deadline,
    ) -> LabyrinthResult<Option<EntityPositionRecord>> {
        deadline.check()?;
        self.store
            .query_entity_latest_position(&self.key, entity, turn)
    }

    /// The latest known position of every entity as of `turn`.
    pub fn positions_as_of(
        &self,
        turn: Turn,
        deadline: &Deadline,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        deadline.check()?;
        self.store.query_positions_as_of(&self.key, turn)
    }

    /// Entities whose latest known position as of `turn` is `tile`.
    pub fn occupants_as_of(
        &self,
        turn: Turn,
        tile: &TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        Ok(self
            .positions_as_of(turn, deadline)?
            .into_iter()
            .filter(|record| &record.tile_id == tile)
            .collect())
    }

    fn entity_lock(&self, entity: &EntityId) -> LabyrinthResult<Arc<Mutex<()>>> {
        let mut locks = self
            .entity_locks
            .lock()
            .map_err(|_| LabyrinthError::Storage("entity lock table poisoned".into()))?;
        Ok(Arc::clone(locks.entry(entity.clone()).or_default()))
    }

    /// Drop the table entry once no other caller holds or waits on it, so the
    /// table only ever holds entities with a record in flight.
    fn release_entity_lock(&self, entity: &EntityId, entity_lock: Arc<Mutex<()>>) {
        let mut locks = self
            .entity_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Clones are only handed out under the table lock: one for the table, one here.
        if Arc::strong_count(&entity_lock) == 2 {
            locks.remove(entity);
        }
    }

    #[cfg(test)]
    fn lock_table_len(&self) -> usize {
        self.entity_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn history_answers_exact_and_as_of_queries(
            gaps in prop::collection::vec(1u64..5, 1..8),
        ) {
            let tracker =
                EntityPositionTracker::new(LabyrinthKey::new("s", "l"), Arc::new(MemoryStore::new()));
            let entity = EntityId::from("walker");
            let none = Deadline::none();

            let mut turns = Vec::new();
            let mut turn = 0;
            for (i, gap) in gaps.iter().enumerate() {
                turn += gap;
                turns.push(turn);
                tracker
                    .record_position(
                        Turn(turn),
                        entity.clone(),
                        EntityType::Player,
                        TileId::new(format!("T{i}")),
                        &none,
                    )
                    .unwrap();
            }

            for (i, &t) in turns.iter().enumerate() {
                let exact = tracker.positions_at_turn(Turn(t), &none).unwrap();
                prop_assert_eq!(exact.len(), 1);
                prop_assert_eq!(&exact[0].tile_id, &TileId::new(format!("T{i}")));

                let until = turns.get(i + 1).copied().unwrap_or(t + 3);
                for query in t..until {
                    let found = tracker
                        .latest_position_before_or_at(Turn(query), &entity, &none)
                        .unwrap()
                        .unwrap();
                    prop_assert_eq!(found.turn, Turn(t));
                }
            }
        }
    }
}
