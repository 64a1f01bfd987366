//! Maze generator contract - the external source of initial labyrinth layouts.

use crate::error::GenerationError;
use crate::graph::{MazeLayout, MazeSize};

/// Produces the tiles and initial connections of a labyrinth.
///
/// Must be a pure function of `(seed, size)`. The layout is validated by the
/// caller before anything is persisted.
pub trait MazeGenerator: Send + Sync {
    fn generate(&self, seed: &str, size: MazeSize) -> Result<MazeLayout, GenerationError>;
}

impl<F> MazeGenerator for F
where
    F: Fn(&str, MazeSize) -> Result<MazeLayout, GenerationError> + Send + Sync,
{
    fn generate(&self, seed: &str, size: MazeSize) -> Result<MazeLayout, GenerationError> {
        self(seed, size)
    }
}
