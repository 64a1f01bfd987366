//! Position record definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ids::{EntityId, LabyrinthKey, TileId, Turn};

/// Kinds of tracked entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Player,
    Enemy,
    Npc,
    Other,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Player => "player",
            EntityType::Enemy => "enemy",
            EntityType::Npc => "npc",
            EntityType::Other => "other",
        }
    }
}

impl FromStr for EntityType {
    type Err = std::convert::Infallible;

    /// Unrecognized names map to `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "player" => EntityType::Player,
            "enemy" => EntityType::Enemy,
            "npc" => EntityType::Npc,
            _ => EntityType::Other,
        })
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where one entity stood on one turn. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPositionRecord {
    #[serde(flatten)]
    pub key: LabyrinthKey,
    pub turn: Turn,
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub tile_id: TileId,
}

impl EntityPositionRecord {
    pub fn new(
        key: LabyrinthKey,
        turn: Turn,
        entity_id: EntityId,
        entity_type: EntityType,
        tile_id: TileId,
    ) -> Self {
        Self {
            key,
            turn,
            entity_id,
            entity_type,
            tile_id,
        }
    }
}
