//! Entity positions - the append-only, turn-indexed ledger of where entities stand.

mod record;
mod tracker;

pub use record::*;
pub use tracker::*;
