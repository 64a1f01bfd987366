//! # Labyrinth Rules
//!
//! The authoritative state of one maze world: which tiles connect to which,
//! and where every tracked entity stood on every turn. This crate owns the
//! invariants and the storage contracts; it contains no narrative logic.
//!
//! ## Core Components
//!
//! - **graph**: Canonical connection sets and the scoped, single-writer `LabyrinthGraph`
//! - **positions**: Append-only, turn-indexed `EntityPositionTracker`
//! - **storage**: The `LabyrinthStore` contract with in-memory and sled backends
//! - **generator**: The `MazeGenerator` collaborator contract

pub mod deadline;
pub mod error;
pub mod generator;
pub mod graph;
pub mod ids;
pub mod positions;
pub mod storage;

pub use deadline::*;
pub use error::*;
pub use generator::*;
pub use graph::*;
pub use ids::*;
pub use positions::*;
pub use storage::*;
