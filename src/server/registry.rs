use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    common::types::{RoomId, SessionId},
    playback::actor::RoomHandle,
};

/// Room id → running room task.
///
/// Lookups for different rooms never contend beyond a shard lock; everything
/// for one room is serialized by that room's own task.
#[derive(Default)]
pub struct SessionRegistry {
    rooms: DashMap<RoomId, RoomHandle>,
    next_session: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms
            .get(room_id)
            .map(|h| h.value().clone())
            .filter(|h| !h.is_closed())
    }

    /// Returns the room's handle, creating the session through `spawn` when
    /// there is none. The flag is `true` when a new session was created.
    pub fn get_or_create(
        &self,
        room_id: &RoomId,
        spawn: impl FnOnce(SessionId) -> RoomHandle,
    ) -> (RoomHandle, bool) {
        match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => (entry.get().clone(), false),
            Entry::Occupied(mut entry) => {
                let handle = spawn(self.next_session_id());
                entry.insert(handle.clone());
                (handle, true)
            }
            Entry::Vacant(entry) => {
                let handle = spawn(self.next_session_id());
                entry.insert(handle.clone());
                (handle, true)
            }
        }
    }

    pub fn remove(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.remove(room_id).map(|(_, handle)| handle)
    }

    /// Removes the room only while it still belongs to `session_id`, so a
    /// retiring session can never unregister its successor.
    pub fn remove_if_current(&self, room_id: &RoomId, session_id: SessionId) -> bool {
        self.rooms
            .remove_if(room_id, |_, handle| handle.session_id == session_id)
            .is_some()
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.get(room_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn rooms(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|e| e.key().clone()).collect()
    }

    fn next_session_id(&self) -> SessionId {
        SessionId(self.next_session.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
