//! # Labyrinth Narrative
//!
//! Turns labyrinth state into the text a player reads, and binds the graph,
//! position history, and description content to one (session, labyrinth)
//! scope behind a single service.
//!
//! ## Core Components
//!
//! - **content**: Read-only tile description pools, loaded once
//! - **composer**: Combines a random description with live occupancy
//! - **service**: `LabyrinthService`, the orchestrator external callers use
//! - **config**: TOML service configuration

pub mod composer;
pub mod config;
pub mod content;
pub mod logging;
pub mod service;

pub use composer::*;
pub use config::*;
pub use content::*;
pub use logging::*;
pub use service::*;
