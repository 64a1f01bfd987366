//! Connection definitions - unordered edges between tiles.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{LabyrinthError, LabyrinthResult};
use crate::ids::TileId;

/// An unordered pair of distinct tiles.
///
/// Endpoints are stored sorted, so `{A, B}` and `{B, A}` are the same value
/// and compare, hash, and serialize identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "[TileId; 2]", into = "[TileId; 2]")]
pub struct Connection {
    low: TileId,
    high: TileId,
}

impl Connection {
    /// Canonicalize a pair of tiles into a connection.
    pub fn new(a: TileId, b: TileId) -> LabyrinthResult<Self> {
        if a == b {
            return Err(LabyrinthError::SelfConnection(a));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    /// Both endpoints, lowest first.
    pub fn endpoints(&self) -> (&TileId, &TileId) {
        (&self.low, &self.high)
    }

    /// Check if this connection touches a tile.
    pub fn touches(&self, tile: &TileId) -> bool {
        &self.low == tile || &self.high == tile
    }

    /// The endpoint opposite `tile`, if `tile` is an endpoint.
    pub fn other(&self, tile: &TileId) -> Option<&TileId> {
        if &self.low == tile {
            Some(&self.high)
        } else if &self.high == tile {
            Some(&self.low)
        } else {
            None
        }
    }
}

impl TryFrom<[TileId; 2]> for Connection {
    type Error = LabyrinthError;

    fn try_from([a, b]: [TileId; 2]) -> Result<Self, Self::Error> {
        Connection::new(a, b)
    }
}

impl From<Connection> for [TileId; 2] {
    fn from(connection: Connection) -> Self {
        [connection.low, connection.high]
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <-> {}", self.low, self.high)
    }
}

/// A duplicate-free set of connections.
///
/// Serializes as a list of `[a, b]` pairs; duplicate or reversed pairs in
/// stored data collapse into one entry on load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionSet(BTreeSet<Connection>);

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a connection. Returns `false` if it was already present.
    pub fn insert(&mut self, connection: Connection) -> bool {
        self.0.insert(connection)
    }

    /// Remove a connection. Returns `false` if it was absent.
    pub fn remove(&mut self, connection: &Connection) -> bool {
        self.0.remove(connection)
    }

    pub fn contains(&self, connection: &Connection) -> bool {
        self.0.contains(connection)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.0.iter()
    }

    /// Tiles directly connected to `tile`, in sorted order.
    pub fn neighbors<'a>(&'a self, tile: &'a TileId) -> impl Iterator<Item = &'a TileId> + 'a {
        self.0.iter().filter_map(move |c| c.other(tile))
    }
}

impl FromIterator<Connection> for ConnectionSet {
    fn from_iter<I: IntoIterator<Item = Connection>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConnectionSet {
    type Item = &'a Connection;
    type IntoIter = std::collections::btree_set::Iter<'a, Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
