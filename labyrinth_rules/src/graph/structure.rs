//! Graph structure - the persisted shape of one labyrinth.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use super::{Connection, ConnectionSet};
use crate::error::{GenerationError, LabyrinthError, LabyrinthResult};
use crate::ids::{LabyrinthKey, TileId};

/// Declared dimensions of a labyrinth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeSize {
    pub width: u32,
    pub height: u32,
}

impl MazeSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Tiles and connections as produced by a maze generator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeLayout {
    pub tiles: BTreeSet<TileId>,
    pub connections: ConnectionSet,
}

impl MazeLayout {
    /// Check the layout is usable: non-empty and no dangling connections.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.tiles.is_empty() {
            return Err(GenerationError::EmptyLayout);
        }
        for connection in &self.connections {
            let (a, b) = connection.endpoints();
            for tile in [a, b] {
                if !self.tiles.contains(tile) {
                    return Err(GenerationError::DanglingConnection(tile.clone()));
                }
            }
        }
        Ok(())
    }
}

/// Structural change requested on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionAction {
    Connect,
    Disconnect,
}

impl FromStr for ConnectionAction {
    type Err = LabyrinthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connect" => Ok(ConnectionAction::Connect),
            "disconnect" => Ok(ConnectionAction::Disconnect),
            other => Err(LabyrinthError::UnknownAction(other.to_string())),
        }
    }
}

/// The complete structure of one labyrinth instance.
///
/// Fields are private: connections change only through [`GraphStructure::connect`]
/// and [`GraphStructure::disconnect`], which enforce tile existence.
///
/// Deserialization runs the same layout validation as
/// [`GraphStructure::from_layout`], so stored data cannot bypass it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGraphStructure")]
pub struct GraphStructure {
    key: LabyrinthKey,
    seed: String,
    size: MazeSize,
    tiles: BTreeSet<TileId>,
    connections: ConnectionSet,
}

/// Unvalidated wire form of [`GraphStructure`].
#[derive(Deserialize)]
struct RawGraphStructure {
    key: LabyrinthKey,
    seed: String,
    size: MazeSize,
    tiles: BTreeSet<TileId>,
    connections: ConnectionSet,
}

impl TryFrom<RawGraphStructure> for GraphStructure {
    type Error = GenerationError;

    fn try_from(raw: RawGraphStructure) -> Result<Self, Self::Error> {
        let layout = MazeLayout {
            tiles: raw.tiles,
            connections: raw.connections,
        };
        Self::from_layout(raw.key, raw.seed, raw.size, layout)
    }
}

impl GraphStructure {
    /// Build a structure from a generated layout, rejecting unusable layouts.
    pub fn from_layout(
        key: LabyrinthKey,
        seed: impl Into<String>,
        size: MazeSize,
        layout: MazeLayout,
    ) -> Result<Self, GenerationError> {
        layout.validate()?;
        Ok(Self {
            key,
            seed: seed.into(),
            size,
            tiles: layout.tiles,
            connections: layout.connections,
        })
    }

    pub fn key(&self) -> &LabyrinthKey {
        &self.key
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn size(&self) -> MazeSize {
        self.size
    }

    pub fn tiles(&self) -> &BTreeSet<TileId> {
        &self.tiles
    }

    pub fn connections(&self) -> &ConnectionSet {
        &self.connections
    }

    pub fn has_tile(&self, tile: &TileId) -> bool {
        self.tiles.contains(tile)
    }

    /// Check whether two tiles are directly connected.
    pub fn is_connected(&self, a: &TileId, b: &TileId) -> bool {
        Connection::new(a.clone(), b.clone())
            .map(|c| self.connections.contains(&c))
            .unwrap_or(false)
    }

    /// Tiles directly reachable from `tile`.
    pub fn neighbors(&self, tile: &TileId) -> LabyrinthResult<Vec<TileId>> {
        self.require_tile(tile)?;
        Ok(self.connections.neighbors(tile).cloned().collect())
    }

    /// Connect two tiles. Returns `false` if they were already connected.
    pub fn connect(&mut self, a: &TileId, b: &TileId) -> LabyrinthResult<bool> {
        let connection = self.edge(a, b)?;
        Ok(self.connections.insert(connection))
    }

    /// Disconnect two tiles; the pair must currently be connected.
    pub fn disconnect(&mut self, a: &TileId, b: &TileId) -> LabyrinthResult<()> {
        let connection = self.edge(a, b)?;
        if self.connections.remove(&connection) {
            Ok(())
        } else {
            Err(LabyrinthError::ConnectionNotFound {
                a: a.clone(),
                b: b.clone(),
            })
        }
    }

    /// Apply an action. Returns whether the connection set changed.
    pub fn apply(
        &mut self,
        action: ConnectionAction,
        a: &TileId,
        b: &TileId,
    ) -> LabyrinthResult<bool> {
        match action {
            ConnectionAction::Connect => self.connect(a, b),
            ConnectionAction::Disconnect => self.disconnect(a, b).map(|_| true),
        }
    }

    fn edge(&self, a: &TileId, b: &TileId) -> LabyrinthResult<Connection> {
        self.require_tile(a)?;
        self.require_tile(b)?;
        Connection::new(a.clone(), b.clone())
    }

    fn require_tile(&self, tile: &TileId) -> LabyrinthResult<()> {
        if self.has_tile(tile) {
            Ok(())
        } else {
            Err(LabyrinthError::TileNotFound(tile.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: &str) -> TileId {
        TileId::from(id)
    }

    fn abc() -> GraphStructure {
        let layout = MazeLayout {
            tiles: ["A", "B", "C"].into_iter().map(TileId::from).collect(),
            connections: ConnectionSet::new(),
        };
        GraphStructure::from_layout(LabyrinthKey::new("s", "l"), "seed", MazeSize::new(3, 1), layout)
            .unwrap()
    }

    fn pairs(graph: &GraphStructure) -> Vec<(String, String)> {
        graph
            .connections()
            .iter()
            .map(|c| {
                let (a, b) = c.endpoints();
                (a.to_string(), b.to_string())
            })
            .collect()
    }

    #[test]
    fn test_connect_disconnect_scenario() {
        let mut graph = abc();

        assert!(graph.connect(&tile("A"), &tile("B")).unwrap());
        assert_eq!(pairs(&graph), vec![("A".into(), "B".into())]);

        assert!(!graph.connect(&tile("A"), &tile("B")).unwrap());
        assert_eq!(pairs(&graph), vec![("A".into(), "B".into())]);

        graph.connect(&tile("B"), &tile("C")).unwrap();
        assert_eq!(
            pairs(&graph),
            vec![("A".into(), "B".into()), ("B".into(), "C".into())]
        );

        graph.disconnect(&tile("A"), &tile("B")).unwrap();
        assert_eq!(pairs(&graph), vec![("B".into(), "C".into())]);

        let again = graph.disconnect(&tile("A"), &tile("B"));
        assert!(matches!(again, Err(LabyrinthError::ConnectionNotFound { .. })));
        assert_eq!(pairs(&graph), vec![("B".into(), "C".into())]);
    }

    #[test]
    fn test_disconnect_matches_reversed_pair() {
        let mut graph = abc();
        graph.connect(&tile("C"), &tile("A")).unwrap();
        graph.disconnect(&tile("A"), &tile("C")).unwrap();
        assert!(graph.connections().is_empty());
    }

    #[test]
    fn test_unknown_tile() {
        let mut graph = abc();
        let result = graph.connect(&tile("A"), &tile("Z"));
        assert!(matches!(result, Err(LabyrinthError::TileNotFound(t)) if t == tile("Z")));

        let result = graph.disconnect(&tile("Z"), &tile("A"));
        assert!(matches!(result, Err(LabyrinthError::TileNotFound(_))));
        assert!(graph.neighbors(&tile("Z")).is_err());
    }

    #[test]
    fn test_self_connection() {
        let mut graph = abc();
        let result = graph.connect(&tile("A"), &tile("A"));
        assert!(matches!(result, Err(LabyrinthError::SelfConnection(_))));
    }

    #[test]
    fn test_neighbors_and_is_connected() {
        let mut graph = abc();
        graph.connect(&tile("A"), &tile("B")).unwrap();
        graph.connect(&tile("C"), &tile("B")).unwrap();

        assert_eq!(graph.neighbors(&tile("B")).unwrap(), vec![tile("A"), tile("C")]);
        assert!(graph.is_connected(&tile("B"), &tile("A")));
        assert!(!graph.is_connected(&tile("A"), &tile("C")));
        assert!(!graph.is_connected(&tile("A"), &tile("A")));
    }

    #[test]
    fn test_layout_validation() {
        let empty = MazeLayout::default();
        assert_eq!(empty.validate(), Err(GenerationError::EmptyLayout));

        let dangling = MazeLayout {
            tiles: [tile("A")].into_iter().collect(),
            connections: [Connection::new(tile("A"), tile("B")).unwrap()]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            dangling.validate(),
            Err(GenerationError::DanglingConnection(tile("B")))
        );
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("connect".parse::<ConnectionAction>().unwrap(), ConnectionAction::Connect);
        assert_eq!(
            "disconnect".parse::<ConnectionAction>().unwrap(),
            ConnectionAction::Disconnect
        );
        assert!(matches!(
            "teleport".parse::<ConnectionAction>(),
            Err(LabyrinthError::UnknownAction(_))
        ));
    }

    #[test]
    fn test_structure_json_shape() {
        let mut graph = abc();
        graph.connect(&tile("B"), &tile("A")).unwrap();
        let json = serde_json::to_value(&graph).unwrap();
        assert_eq!(json["connections"], serde_json::json!([["A", "B"]]));

        let back: GraphStructure = serde_json::from_value(json).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_deserialize_rejects_dangling_connection() {
        let mut json = serde_json::to_value(abc()).unwrap();
        json["connections"] = serde_json::json!([["A", "Z"]]);
        let err = serde_json::from_value::<GraphStructure>(json).unwrap_err();
        assert!(err.to_string().contains("Z"));
    }

    #[test]
    fn test_deserialize_rejects_empty_tiles() {
        let mut json = serde_json::to_value(abc()).unwrap();
        json["tiles"] = serde_json::json!([]);
        assert!(serde_json::from_value::<GraphStructure>(json).is_err());
    }
}
