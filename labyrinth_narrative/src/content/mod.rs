//! Content module - static narrative text keyed by tile.

mod pool;

pub use pool::*;
