//! Narrative Composer - builds the description a player reads for a tile.
//!
//! Composition works as follows:
//! 1. **Base**: Draw one description variant for the tile from the pool
//! 2. **Occupancy**: Find entities whose latest position as of this turn is the tile
//! 3. **Render**: One `"<name> is here."` sentence per occupant, requester excluded
//! 4. **Join**: Append the occupancy sentences to the base, separated by single spaces
//!
//! Composition never fails. Missing content falls back to a neutral sentence
//! and unreadable occupancy is treated as an empty tile.

mod directory;

pub use directory::*;

use labyrinth_rules::{Deadline, EntityId, EntityPositionRecord, EntityPositionTracker, TileId, Turn};
use rand::Rng;
use std::sync::Arc;
use tracing::warn;

use crate::content::TileDescriptionPool;

/// Combines static tile content with live occupancy.
///
/// The composer holds no mutable state; randomness is passed in by the caller.
#[derive(Clone)]
pub struct NarrativeComposer {
    pool: Arc<TileDescriptionPool>,
    directory: Arc<dyn EntityDirectory>,
}

impl NarrativeComposer {
    pub fn new(pool: Arc<TileDescriptionPool>, directory: Arc<dyn EntityDirectory>) -> Self {
        Self { pool, directory }
    }

    pub fn pool(&self) -> &TileDescriptionPool {
        &self.pool
    }

    /// A random base description for the tile.
    pub fn random_tile_description<R: Rng + ?Sized>(&self, tile: &TileId, rng: &mut R) -> String {
        self.pool.choose(tile, rng).to_string()
    }

    /// Occupancy sentences for the tile as of `turn`, excluding `exclude`.
    ///
    /// Returns an empty string when nobody else is there or the history
    /// cannot be read.
    pub fn entities_description(
        &self,
        tracker: &EntityPositionTracker,
        tile: &TileId,
        turn: Turn,
        exclude: Option<&EntityId>,
        deadline: &Deadline,
    ) -> String {
        match tracker.occupants_as_of(turn, tile, deadline) {
            Ok(occupants) => self.render_occupants(&occupants, exclude),
            Err(err) => {
                warn!(
                    labyrinth = %tracker.key(),
                    %tile,
                    %turn,
                    error = %err,
                    "occupancy unavailable; describing tile as empty"
                );
                String::new()
            }
        }
    }

    /// Render `"<name> is here."` for each occupant other than `exclude`, in entity-ID order.
    pub fn render_occupants(
        &self,
        occupants: &[EntityPositionRecord],
        exclude: Option<&EntityId>,
    ) -> String {
        let mut present: Vec<&EntityId> = occupants
            .iter()
            .map(|record| &record.entity_id)
            .filter(|entity| Some(*entity) != exclude)
            .collect();
        present.sort();
        present.dedup();

        present
            .into_iter()
            .map(|entity| format!("{} is here.", self.name_of(entity)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The full description `requester` sees at `tile` on `turn`.
    ///
    /// Never empty: with no content and no company it is the fallback sentence.
    pub fn generate_full_description<R: Rng + ?Sized>(
        &self,
        tracker: &EntityPositionTracker,
        rng: &mut R,
        requester: &EntityId,
        tile: &TileId,
        turn: Turn,
        deadline: &Deadline,
    ) -> String {
        let base = self.random_tile_description(tile, rng);
        let entities = self.entities_description(tracker, tile, turn, Some(requester), deadline);
        combine(base, &entities)
    }

    fn name_of(&self, entity: &EntityId) -> String {
        self.directory
            .display_name(entity)
            .unwrap_or_else(|| entity.to_string())
    }
}

pub(crate) fn combine(mut base: String, entities: &str) -> String {
    if !entities.is_empty() {
        base.push(' ');
        base.push_str(entities);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FALLBACK_DESCRIPTION;
    use labyrinth_rules::{EntityType, LabyrinthKey, LabyrinthStore, MemoryStore};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::{Duration, Instant};

    fn tracker() -> EntityPositionTracker {
        let store: Arc<dyn LabyrinthStore> = Arc::new(MemoryStore::new());
        EntityPositionTracker::new(LabyrinthKey::new("s", "l"), store)
    }

    fn place(tracker: &EntityPositionTracker, turn: u64, entity: &str, tile: &str) {
        tracker
            .record_position(
                Turn(turn),
                EntityId::from(entity),
                EntityType::Player,
                TileId::from(tile),
                &Deadline::none(),
            )
            .unwrap();
    }

    fn composer(pool: TileDescriptionPool) -> NarrativeComposer {
        NarrativeComposer::new(Arc::new(pool), Arc::new(IdDirectory))
    }

    #[test]
    fn test_co_located_entity_is_described() {
        let tracker = tracker();
        place(&tracker, 0, "p1", "A");
        place(&tracker, 0, "p2", "A");

        let composer = composer(TileDescriptionPool::new().with_default(["A bare room."]));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let text = composer.generate_full_description(
            &tracker,
            &mut rng,
            &EntityId::from("p1"),
            &TileId::from("A"),
            Turn(0),
            &Deadline::none(),
        );

        assert_eq!(text, "A bare room. p2 is here.");
        assert!(!text.contains("p1"));
    }

    #[test]
    fn test_empty_everything_gives_fallback() {
        let tracker = tracker();
        let composer = composer(TileDescriptionPool::new());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let text = composer.generate_full_description(
            &tracker,
            &mut rng,
            &EntityId::from("p1"),
            &TileId::from("A"),
            Turn(0),
            &Deadline::none(),
        );
        assert_eq!(text, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_requester_alone_is_not_mentioned() {
        let tracker = tracker();
        place(&tracker, 0, "p1", "A");

        let composer = composer(TileDescriptionPool::new());
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let text = composer.generate_full_description(
            &tracker,
            &mut rng,
            &EntityId::from("p1"),
            &TileId::from("A"),
            Turn(0),
            &Deadline::none(),
        );
        assert_eq!(text, FALLBACK_DESCRIPTION);
    }

    #[test]
    fn test_entities_who_have_not_moved_are_still_present() {
        let tracker = tracker();
        place(&tracker, 0, "guard", "A");
        place(&tracker, 0, "rat", "A");
        place(&tracker, 2, "rat", "B");
        place(&tracker, 3, "p1", "A");

        let composer = composer(TileDescriptionPool::new());
        let text = composer.entities_description(
            &tracker,
            &TileId::from("A"),
            Turn(3),
            Some(&EntityId::from("p1")),
            &Deadline::none(),
        );
        assert_eq!(text, "guard is here.");
    }

    #[test]
    fn test_names_come_from_directory() {
        let tracker = tracker();
        place(&tracker, 0, "e2", "A");
        place(&tracker, 0, "e1", "A");
        place(&tracker, 0, "e3", "A");

        let directory = NameDirectory::new().with_name("e1", "Ogre").with_name("e2", "Bat");
        let composer = NarrativeComposer::new(Arc::new(TileDescriptionPool::new()), Arc::new(directory));
        let text = composer.entities_description(
            &tracker,
            &TileId::from("A"),
            Turn(0),
            None,
            &Deadline::none(),
        );
        assert_eq!(text, "Ogre is here. Bat is here. e3 is here.");
    }

    #[test]
    fn test_unreadable_history_degrades_to_empty() {
        let tracker = tracker();
        place(&tracker, 0, "p2", "A");

        let composer = composer(TileDescriptionPool::new().with_default(["Quiet."]));
        let expired = Deadline::at(Instant::now() - Duration::from_millis(1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let text = composer.generate_full_description(
            &tracker,
            &mut rng,
            &EntityId::from("p1"),
            &TileId::from("A"),
            Turn(0),
            &expired,
        );
        assert_eq!(text, "Quiet.");
    }

    #[test]
    fn test_fixed_seed_gives_fixed_text() {
        let tracker = tracker();
        place(&tracker, 0, "p2", "A");
        let composer = composer(TileDescriptionPool::builtin());

        let describe = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            composer.generate_full_description(
                &tracker,
                &mut rng,
                &EntityId::from("p1"),
                &TileId::from("A"),
                Turn(0),
                &Deadline::none(),
            )
        };
        let text = describe(99);
        assert_eq!(text, describe(99));
        assert!(text.ends_with(" p2 is here."));
    }

    #[test]
    fn test_render_occupants_deduplicates() {
        let composer = composer(TileDescriptionPool::new());
        let key = LabyrinthKey::new("s", "l");
        let record = |entity: &str, turn| {
            EntityPositionRecord::new(
                key.clone(),
                Turn(turn),
                EntityId::from(entity),
                EntityType::Npc,
                TileId::from("A"),
            )
        };
        let text = composer.render_occupants(&[record("b", 0), record("a", 0), record("b", 1)], None);
        assert_eq!(text, "a is here. b is here.");
    }
}
