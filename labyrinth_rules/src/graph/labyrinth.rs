//! The scoped labyrinth graph - creation, loading, and serialized structural mutation.

use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use super::{ConnectionAction, GraphStructure, MazeSize};
use crate::deadline::Deadline;
use crate::error::{LabyrinthError, LabyrinthResult};
use crate::generator::MazeGenerator;
use crate::ids::{LabyrinthKey, TileId};
use crate::storage::LabyrinthStore;

/// Owner of one labyrinth's connectivity.
///
/// Every structural change is a read-modify-write of the whole structure held
/// under `writer`, so concurrent callers in this scope never lose updates.
/// The modified copy is written with a single `put_labyrinth`; if the deadline
/// passes or the call fails first, the stored structure is untouched.
pub struct LabyrinthGraph {
    key: LabyrinthKey,
    store: Arc<dyn LabyrinthStore>,
    generator: Arc<dyn MazeGenerator>,
    writer: Mutex<()>,
}

impl LabyrinthGraph {
    pub fn new(
        key: LabyrinthKey,
        store: Arc<dyn LabyrinthStore>,
        generator: Arc<dyn MazeGenerator>,
    ) -> Self {
        Self {
            key,
            store,
            generator,
            writer: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &LabyrinthKey {
        &self.key
    }

    /// Generate and persist a new labyrinth for this scope.
    ///
    /// Fails with `Generation` if the generator fails or returns an unusable
    /// layout, and with `AlreadyExists` if the scope already has a labyrinth.
    /// Nothing is persisted on failure.
    pub fn create(
        &self,
        seed: &str,
        size: MazeSize,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        let _writer = self.lock_writer()?;

        deadline.check()?;
        if self.store.get_labyrinth(&self.key)?.is_some() {
            return Err(LabyrinthError::AlreadyExists(self.key.clone()));
        }

        let layout = self.generator.generate(seed, size)?;
        let structure = GraphStructure::from_layout(self.key.clone(), seed, size, layout)?;

        deadline.check()?;
        self.store.put_labyrinth(&structure)?;

        info!(
            labyrinth = %self.key,
            seed,
            tiles = structure.tiles().len(),
            connections = structure.connections().len(),
            "created labyrinth"
        );
        Ok(structure)
    }

    /// Load the persisted structure, or `None` if no labyrinth exists yet.
    pub fn load(&self, deadline: &Deadline) -> LabyrinthResult<Option<GraphStructure>> {
        deadline.check()?;
        let structure = self.store.get_labyrinth(&self.key)?;
        debug!(labyrinth = %self.key, found = structure.is_some(), "loaded labyrinth");
        Ok(structure)
    }

    /// Load the persisted structure, failing with `NotFound` if absent.
    pub fn require(&self, deadline: &Deadline) -> LabyrinthResult<GraphStructure> {
        self.load(deadline)?
            .ok_or_else(|| LabyrinthError::NotFound(self.key.clone()))
    }

    /// Connect two tiles. Connecting an already-connected pair is a no-op.
    pub fn connect(
        &self,
        a: &TileId,
        b: &TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        self.update_connections(a, b, ConnectionAction::Connect, deadline)
    }

    /// Disconnect two tiles. Fails with `ConnectionNotFound` if they are not connected.
    pub fn disconnect(
        &self,
        a: &TileId,
        b: &TileId,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        self.update_connections(a, b, ConnectionAction::Disconnect, deadline)
    }

    /// Apply a structural action and persist the result atomically.
    ///
    /// Returns the structure as committed.
    pub fn update_connections(
        &self,
        a: &TileId,
        b: &TileId,
        action: ConnectionAction,
        deadline: &Deadline,
    ) -> LabyrinthResult<GraphStructure> {
        let _writer = self.lock_writer()?;

        let mut next = self.require(deadline)?;
        let changed = next.apply(action, a, b)?;
        if !changed {
            debug!(labyrinth = %self.key, %a, %b, "connection already present");
            return Ok(next);
        }

        deadline.check()?;
        self.store.put_labyrinth(&next)?;

        info!(labyrinth = %self.key, ?action, %a, %b, "updated connections");
        Ok(next)
    }

    fn lock_writer(&self) -> LabyrinthResult<MutexGuard<'_, ()>> {
        self.writer
            .lock()
            .map_err(|_| LabyrinthError::Storage("labyrinth writer lock poisoned".into()))
    }
}
