//! Room registry: creates rooms on demand and forgets them once empty.

use std::collections::HashMap;

use rand::Rng;
use rochambeau_protocol::RoomId;

use crate::{MatchConfig, Room};

/// Lowest generated room code.
const MIN_CODE: u32 = 100_000;
/// Highest generated room code.
const MAX_CODE: u32 = 999_999;

/// Owns every live room, keyed by code.
///
/// An empty room never outlives the operation that emptied it: callers
/// invoke [`remove_if_empty`](Self::remove_if_empty) after each operation.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    config: MatchConfig,
}

impl RoomRegistry {
    /// Creates an empty registry. Every room it creates uses `config`.
    pub fn new(config: MatchConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config: config.validated(),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Returns the room with this code, creating an empty one if needed.
    pub fn get_or_create(&mut self, room_id: &RoomId) -> &mut Room {
        let config = &self.config;
        self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, "room created");
            Room::new(room_id.clone(), config)
        })
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Deletes a room. No-op if it does not exist.
    pub fn remove(&mut self, room_id: &RoomId) -> Option<Room> {
        let removed = self.rooms.remove(room_id);
        if removed.is_some() {
            tracing::info!(%room_id, "room removed");
        }
        removed
    }

    /// Deletes the room if nobody is left in it. Returns `true` if it was
    /// removed.
    pub fn remove_if_empty(&mut self, room_id: &RoomId) -> bool {
        let empty = self.rooms.get(room_id).is_some_and(Room::is_empty);
        if empty {
            self.remove(room_id);
        }
        empty
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Lists all live room codes, in no particular order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    /// Picks a random six-digit code that no live room uses.
    ///
    /// The code is not reserved: the room only exists once someone joins
    /// it through [`get_or_create`](Self::get_or_create).
    pub fn generate_room_id(&self) -> RoomId {
        let mut rng = rand::rng();
        loop {
            let candidate = RoomId::from(rng.random_range(MIN_CODE..=MAX_CODE));
            if !self.rooms.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rochambeau_protocol::ParticipantId;

    use super::*;

    fn code(raw: &str) -> RoomId {
        RoomId::parse(raw).unwrap()
    }

    #[test]
    fn test_get_or_create_reuses_room() {
        let mut registry = RoomRegistry::default();
        registry
            .get_or_create(&code("R1"))
            .join(ParticipantId(1), "Alice")
            .unwrap();

        let room = registry.get_or_create(&code("R1"));

        assert_eq!(room.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_missing_room_is_noop() {
        let mut registry = RoomRegistry::default();
        assert!(registry.remove(&code("nope")).is_none());
    }

    #[test]
    fn test_remove_if_empty_keeps_occupied_rooms() {
        let mut registry = RoomRegistry::default();
        let r1 = code("R1");
        registry
            .get_or_create(&r1)
            .join(ParticipantId(1), "Alice")
            .unwrap();

        assert!(!registry.remove_if_empty(&r1));
        assert!(registry.contains(&r1));

        registry
            .get_mut(&r1)
            .unwrap()
            .leave(ParticipantId(1), crate::LeaveReason::Left)
            .unwrap();

        assert!(registry.remove_if_empty(&r1));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_generate_room_id_is_six_digits() {
        let registry = RoomRegistry::default();
        for _ in 0..50 {
            let id = registry.generate_room_id();
            let n: u32 = id.as_str().parse().unwrap();
            assert!((MIN_CODE..=MAX_CODE).contains(&n), "{id} out of range");
        }
    }

    #[test]
    fn test_new_validates_config() {
        let registry = RoomRegistry::new(MatchConfig::first_to(0));
        assert_eq!(registry.config().win_threshold, 1);
    }
}
