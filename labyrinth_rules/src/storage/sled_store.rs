//! Sled-backed persistent store.
//!
//! Two trees: `labyrinths` maps a scope key to the JSON structure, and
//! `positions` maps `scope ++ entity ++ turn` to the JSON record. Key segments
//! are length-prefixed and turns are big-endian, so a prefix scan walks one
//! scope (or one entity) in ascending turn order.

use std::path::Path;

use super::LabyrinthStore;
use crate::error::{LabyrinthError, LabyrinthResult};
use crate::graph::GraphStructure;
use crate::ids::{EntityId, LabyrinthKey, Turn};
use crate::positions::EntityPositionRecord;

/// Store backed by an embedded sled database.
pub struct SledStore {
    db: sled::Db,
    labyrinths: sled::Tree,
    positions: sled::Tree,
}

impl SledStore {
    /// Open a persistent store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> LabyrinthResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Open a store that is deleted when dropped.
    pub fn temporary() -> LabyrinthResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> LabyrinthResult<Self> {
        let labyrinths = db.open_tree("labyrinths")?;
        let positions = db.open_tree("positions")?;
        Ok(Self {
            db,
            labyrinths,
            positions,
        })
    }

    fn scope_prefix(key: &LabyrinthKey) -> LabyrinthResult<Vec<u8>> {
        let mut out = Vec::new();
        push_segment(&mut out, key.session_id.as_str())?;
        push_segment(&mut out, key.labyrinth_id.as_str())?;
        Ok(out)
    }

    fn entity_prefix(key: &LabyrinthKey, entity: &EntityId) -> LabyrinthResult<Vec<u8>> {
        let mut out = Self::scope_prefix(key)?;
        push_segment(&mut out, entity.as_str())?;
        Ok(out)
    }

    fn record_key(key: &LabyrinthKey, entity: &EntityId, turn: Turn) -> LabyrinthResult<Vec<u8>> {
        let mut out = Self::entity_prefix(key, entity)?;
        out.extend_from_slice(&turn.0.to_be_bytes());
        Ok(out)
    }

    fn scan_scope(
        &self,
        key: &LabyrinthKey,
    ) -> LabyrinthResult<impl Iterator<Item = LabyrinthResult<EntityPositionRecord>>> {
        Ok(self
            .positions
            .scan_prefix(Self::scope_prefix(key)?)
            .map(|entry| {
                let (_, value) = entry?;
                Ok(serde_json::from_slice(&value)?)
            }))
    }
}

/// Length prefix for a key segment; ids longer than `u32::MAX` bytes are rejected.
fn segment_len(len: usize) -> LabyrinthResult<[u8; 4]> {
    u32::try_from(len)
        .map(u32::to_be_bytes)
        .map_err(|_| LabyrinthError::Storage(format!("key segment of {len} bytes is too long")))
}

fn push_segment(out: &mut Vec<u8>, segment: &str) -> LabyrinthResult<()> {
    out.extend_from_slice(&segment_len(segment.len())?);
    out.extend_from_slice(segment.as_bytes());
    Ok(())
}

impl LabyrinthStore for SledStore {
    fn get_labyrinth(&self, key: &LabyrinthKey) -> LabyrinthResult<Option<GraphStructure>> {
        match self.labyrinths.get(Self::scope_prefix(key)?)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_labyrinth(&self, structure: &GraphStructure) -> LabyrinthResult<()> {
        let bytes = serde_json::to_vec(structure)?;
        self.labyrinths
            .insert(Self::scope_prefix(structure.key())?, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    fn insert_position_record(&self, record: &EntityPositionRecord) -> LabyrinthResult<()> {
        let key = Self::record_key(&record.key, &record.entity_id, record.turn)?;
        let bytes = serde_json::to_vec(record)?;
        let swapped = self
            .positions
            .compare_and_swap(key, None as Option<&[u8]>, Some(bytes))?;
        if swapped.is_err() {
            return Err(LabyrinthError::DuplicateRecord {
                entity: record.entity_id.clone(),
                turn: record.turn,
            });
        }
        self.db.flush()?;
        Ok(())
    }

    fn query_positions(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        let mut records = Vec::new();
        for record in self.scan_scope(key)? {
            let record = record?;
            if record.turn == turn {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn query_entity_latest_position(
        &self,
        key: &LabyrinthKey,
        entity: &EntityId,
        turn: Turn,
    ) -> LabyrinthResult<Option<EntityPositionRecord>> {
        let start = Self::record_key(key, entity, Turn::ZERO)?;
        let end = Self::record_key(key, entity, turn)?;
        match self.positions.range(start..=end).next_back() {
            Some(entry) => {
                let (_, value) = entry?;
                Ok(Some(serde_json::from_slice(&value)?))
            }
            None => Ok(None),
        }
    }

    fn query_positions_as_of(
        &self,
        key: &LabyrinthKey,
        turn: Turn,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        // Records arrive grouped by entity, turns ascending within each group.
        let mut latest: Vec<EntityPositionRecord> = Vec::new();
        for record in self.scan_scope(key)? {
            let record = record?;
            if record.turn > turn {
                continue;
            }
            match latest.last_mut() {
                Some(last) if last.entity_id == record.entity_id => *last = record,
                _ => latest.push(record),
            }
        }
        latest.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
        Ok(latest)
    }
}
