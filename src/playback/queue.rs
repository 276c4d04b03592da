use std::collections::VecDeque;

use super::track::Track;

/// Ordered tracks waiting to be played in one room. Insertion order is play order.
#[derive(Debug, Default, Clone)]
pub struct RoomQueue {
    tracks: VecDeque<Track>,
}

impl RoomQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the tail and returns the 1-based position of the new entry.
    pub fn enqueue(&mut self, track: Track) -> usize {
        self.tracks.push_back(track);
        self.tracks.len()
    }

    pub fn dequeue(&mut self) -> Option<Track> {
        self.tracks.pop_front()
    }

    /// Removes every pending track and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.tracks.len();
        self.tracks.clear();
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}
