//! Error types for labyrinth state operations.

use thiserror::Error;

use crate::ids::{EntityId, LabyrinthKey, TileId, Turn};

/// Result type for labyrinth operations.
pub type LabyrinthResult<T> = Result<T, LabyrinthError>;

/// Errors that can occur while reading or mutating labyrinth state.
#[derive(Debug, Error)]
pub enum LabyrinthError {
    /// No labyrinth has been created for this scope yet.
    #[error("labyrinth not found: {0}")]
    NotFound(LabyrinthKey),

    /// A labyrinth already exists for this scope.
    #[error("labyrinth already exists: {0}")]
    AlreadyExists(LabyrinthKey),

    /// A tile ID is not part of the labyrinth.
    #[error("tile not found: {0}")]
    TileNotFound(TileId),

    /// The unordered pair was never connected.
    #[error("connection not found: {a} <-> {b}")]
    ConnectionNotFound { a: TileId, b: TileId },

    /// A tile cannot be connected to itself.
    #[error("cannot connect tile {0} to itself")]
    SelfConnection(TileId),

    /// The entity already has a record for this turn.
    #[error("entity {entity} already has a position for turn {turn}")]
    DuplicateRecord { entity: EntityId, turn: Turn },

    /// The entity's history already extends past this turn.
    #[error("entity {entity} is at turn {latest}; cannot record turn {turn}")]
    TurnRegression {
        entity: EntityId,
        turn: Turn,
        latest: Turn,
    },

    /// The maze generator failed or produced an unusable layout.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Unrecognized connection action name.
    #[error("unknown connection action: {0}")]
    UnknownAction(String),

    /// Backend storage failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Stored data could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The caller's deadline passed before the operation committed.
    #[error("operation timed out")]
    Timeout,

    /// The caller cancelled the operation before it committed.
    #[error("operation cancelled")]
    Cancelled,
}

impl LabyrinthError {
    /// Whether the failure is environmental rather than a precondition violation.
    ///
    /// Only idempotent operations (reads, `connect`) should be retried blindly.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LabyrinthError::Storage(_) | LabyrinthError::Timeout | LabyrinthError::Cancelled
        )
    }
}

impl From<sled::Error> for LabyrinthError {
    fn from(err: sled::Error) -> Self {
        LabyrinthError::Storage(err.to_string())
    }
}

/// Failure reported by a `MazeGenerator`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The generator itself failed.
    #[error("{0}")]
    Failed(String),

    /// The generator returned no tiles.
    #[error("generator produced an empty tile set")]
    EmptyLayout,

    /// A generated connection references a tile that was not generated.
    #[error("generated connection references unknown tile {0}")]
    DanglingConnection(TileId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LabyrinthError::Timeout.is_transient());
        assert!(LabyrinthError::Storage("disk".into()).is_transient());
        assert!(!LabyrinthError::TileNotFound(TileId::from("A")).is_transient());
        assert!(!LabyrinthError::ConnectionNotFound {
            a: TileId::from("A"),
            b: TileId::from("B"),
        }
        .is_transient());
    }

    #[test]
    fn test_error_messages() {
        let err = LabyrinthError::DuplicateRecord {
            entity: EntityId::from("p1"),
            turn: Turn(3),
        };
        assert_eq!(err.to_string(), "entity p1 already has a position for turn 3");

        let err: LabyrinthError = GenerationError::EmptyLayout.into();
        assert!(err.to_string().contains("empty tile set"));
    }
}
