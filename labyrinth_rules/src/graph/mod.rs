//! Labyrinth graph - tiles, unordered connections, and the scoped graph owner.
//!
//! - **Connection**: A canonical unordered pair of distinct tiles
//! - **GraphStructure**: The persisted tiles and connection set of one labyrinth
//! - **LabyrinthGraph**: Loads, creates, and mutates one scope's structure under a single writer

mod connection;
mod labyrinth;
mod structure;

pub use connection::*;
pub use labyrinth::*;
pub use structure::*;
