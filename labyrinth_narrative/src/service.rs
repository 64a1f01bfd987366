//! Labyrinth service - one coherent API over a single (session, labyrinth) scope.

use labyrinth_rules::{
    ConnectionAction, Deadline, EntityId, EntityPositionRecord, EntityPositionTracker, EntityType,
    GraphStructure, LabyrinthError, LabyrinthGraph, LabyrinthKey, LabyrinthResult, LabyrinthStore,
    MazeGenerator, MazeSize, TileId, Turn,
};
use rand::RngCore;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::composer::{combine, EntityDirectory, NarrativeComposer};
use crate::config::{ConfigError, ServiceConfig};

/// Binds the graph, position history, and narrative composer to one scope.
///
/// The service exclusively owns its scope's `LabyrinthGraph` and
/// `EntityPositionTracker`; share it behind an `Arc` rather than building a
/// second service for the same scope, since the single-writer lock lives here.
pub struct LabyrinthService {
    key: LabyrinthKey,
    graph: LabyrinthGraph,
    tracker: EntityPositionTracker,
    composer: NarrativeComposer,
    rng: Mutex<Box<dyn RngCore + Send>>,
    request_timeout: Option<Duration>,
}

impl LabyrinthService {
    pub fn new(
        key: LabyrinthKey,
        store: Arc<dyn LabyrinthStore>,
        generator: Arc<dyn MazeGenerator>,
        composer: NarrativeComposer,
        rng: impl RngCore + Send + 'static,
    ) -> Self {
        Self {
            graph: LabyrinthGraph::new(key.clone(), Arc::clone(&store), generator),
            tracker: EntityPositionTracker::new(key.clone(), store),
            key,
            composer,
            rng: Mutex::new(Box::new(rng)),
            request_timeout: None,
        }
    }

    /// Wire storage, content, and randomness from configuration.
    pub fn from_config(
        key: LabyrinthKey,
        config: &ServiceConfig,
        generator: Arc<dyn MazeGenerator>,
        directory: Arc<dyn EntityDirectory>,
    ) -> Result<Self, ConfigError> {
        config.init_logging();
        let store = config.storage.open()?;
        let composer = NarrativeComposer::new(config.narrative.pool()?, directory);
        let service = Self::new(key, store, generator, composer, config.narrative.rng())
            .with_request_timeout(config.request_timeout());
        Ok(service)
    }

    /// Default time limit applied by [`LabyrinthService::deadline`].
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn key(&self) -> &LabyrinthKey {
        &self.key
    }

    pub fn graph(&self) -> &LabyrinthGraph {
        &self.graph
    }

    pub fn tracker(&self) -> &EntityPositionTracker {
        &self.tracker
    }

    /// A fresh deadline using the configured request timeout.
    pub fn deadline(&self) -> Deadline {
        match self.request_timeout {
            Some(timeout) => Deadline::after(timeout),
            None => Deadline::none(),
        }
    }

    /// Generate and persist this scope's labyrinth.
    pub fn create_labyrinth(
        &self,
        seed: &str,
        size: MazeSize,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        self.graph.create(seed, size, deadline)
    }

    /// The stored structure, or `None` if no labyrinth was created yet.
    pub fn labyrinth_structure(&self, deadline: &Deadline) -> LabyrinthResult<Option<GraphStructure>> {
        self.graph.load(deadline)
    }

    /// Connect or disconnect two tiles.
    pub fn update_connections(
        &self,
        a: &TileId,
        b: &TileId,
        action: ConnectionAction,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        self.graph.update_connections(a, b, action, deadline)
    }

    pub fn connect(&self, a: &TileId, b: &TileId, deadline: &Deadline) -> LabyrinthResult<GraphStructure> {
        self.graph.connect(a, b, deadline)
    }

    pub fn disconnect(
        &self,
        a: &TileId,
        b: &TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        self.graph.disconnect(a, b, deadline)
    }

    /// Record where an entity stands on a turn.
    ///
    /// The labyrinth must exist and contain `tile`.
    pub fn track_entity_position(
        &self,
        turn: Turn,
        entity: EntityId,
        entity_type: EntityType,
        tile: TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<EntityPositionRecord> {
        let structure = self.graph.require(deadline)?;
        if !structure.has_tile(&tile) {
            return Err(LabyrinthError::TileNotFound(tile));
        }
        self.tracker
            .record_position(turn, entity, entity_type, tile, deadline)
    }

    /// All positions recorded for exactly `turn`.
    pub fn entity_positions(
        &self,
        turn: Turn,
        deadline: &Deadline,
    ) -> LabyrinthResult<Vec<EntityPositionRecord>> {
        self.tracker.positions_at_turn(turn, deadline)
    }

    /// Where `entity` was as of `turn`.
    pub fn latest_entity_position(
        &self,
        turn: Turn,
        entity: &EntityId,
        deadline: &Deadline,
    ) -> LabyrinthResult<Option<EntityPositionRecord>> {
        self.tracker
            .latest_position_before_or_at(turn, entity, deadline)
    }

    /// A random base description for a tile.
    pub fn random_tile_description(&self, tile: &TileId) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        self.composer.random_tile_description(tile, &mut **rng)
    }

    /// Who else is at `tile` as of `turn`.
    pub fn entities_description(&self, tile: &TileId, turn: Turn, exclude: Option<&EntityId>) -> String {
        self.composer
            .entities_description(&self.tracker, tile, turn, exclude, &self.deadline())
    }

    /// The full description `player` sees at `tile` on `turn`. Never fails.
    ///
    /// The RNG lock covers only the base choice; the occupancy read runs
    /// outside it so concurrent requests do not queue behind storage.
    pub fn generate_full_description(&self, player: &EntityId, tile: &TileId, turn: Turn) -> String {
        let base = self.random_tile_description(tile);
        let entities = self.entities_description(tile, turn, Some(player));
        debug!(labyrinth = %self.key, %player, %tile, %turn, "composed description");
        combine(base, &entities)
    }
}
