//! Identifiers for sessions, labyrinths, tiles, and entities, plus the turn counter.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id! {
    /// Identifier of a game session.
    SessionId
}

string_id! {
    /// Identifier of a labyrinth within a session.
    LabyrinthId
}

string_id! {
    /// Identifier of a single tile (location node).
    TileId
}

string_id! {
    /// Identifier of a tracked entity (player, enemy, npc, ...).
    EntityId
}

impl SessionId {
    /// Create a fresh random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl LabyrinthId {
    /// Create a fresh random labyrinth ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

/// A discrete step of game time. Unsigned, so never negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Turn(pub u64);

impl Turn {
    pub const ZERO: Turn = Turn(0);

    pub fn new(turn: u64) -> Self {
        Self(turn)
    }

    /// The turn after this one.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl From<u64> for Turn {
    fn from(turn: u64) -> Self {
        Self(turn)
    }
}

impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The (session, labyrinth) scope every piece of state belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabyrinthKey {
    pub session_id: SessionId,
    pub labyrinth_id: LabyrinthId,
}

impl LabyrinthKey {
    pub fn new(session_id: impl Into<SessionId>, labyrinth_id: impl Into<LabyrinthId>) -> Self {
        Self {
            session_id: session_id.into(),
            labyrinth_id: labyrinth_id.into(),
        }
    }
}

impl std::fmt::Display for LabyrinthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.session_id, self.labyrinth_id)
    }
}
