//! Entity directory - resolves entity IDs to display names.

use labyrinth_rules::EntityId;
use std::collections::HashMap;

/// Resolves entities to the names shown in narration.
///
/// The labyrinth state stores only IDs; names live with whoever owns entity
/// metadata.
pub trait EntityDirectory: Send + Sync {
    /// The display name for an entity, if known.
    fn display_name(&self, entity: &EntityId) -> Option<String>;
}

/// Directory that uses each entity's ID as its name.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdDirectory;

impl EntityDirectory for IdDirectory {
    fn display_name(&self, entity: &EntityId) -> Option<String> {
        Some(entity.to_string())
    }
}

/// Directory backed by a fixed name table.
#[derive(Debug, Clone, Default)]
pub struct NameDirectory {
    names: HashMap<EntityId, String>,
}

impl NameDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name.
    pub fn with_name(mut self, entity: impl Into<EntityId>, name: impl Into<String>) -> Self {
        self.insert(entity, name);
        self
    }

    pub fn insert(&mut self, entity: impl Into<EntityId>, name: impl Into<String>) {
        self.names.insert(entity.into(), name.into());
    }
}

impl EntityDirectory for NameDirectory {
    fn display_name(&self, entity: &EntityId) -> Option<String> {
        self.names.get(entity).cloned()
    }
}
