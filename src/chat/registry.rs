//! Room membership registry for Plaza.
//!
//! The gateway owns one registry instance. Membership is keyed by room
//! id, then by connection id; each member holds the sending half of its
//! connection's outbound channel. All membership state lives here, with
//! explicit add/remove operations.

use std::collections::HashMap;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

/// Registry of room memberships.
///
/// Generic over the outbound payload so the membership bookkeeping stays
/// independent of the wire protocol.
pub struct RoomRegistry<T> {
    rooms: RwLock<HashMap<i64, HashMap<String, UnboundedSender<T>>>>,
}

impl<T: Clone> RoomRegistry<T> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add a connection to a room's broadcast group.
    ///
    /// Joining a room the connection is already in replaces its sender.
    pub async fn join(&self, room_id: i64, connection_id: &str, sender: UnboundedSender<T>) {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room_id)
            .or_default()
            .insert(connection_id.to_string(), sender);
    }

    /// Remove a connection from a room.
    ///
    /// Returns true if the connection was a member. Empty rooms are
    /// dropped from the map.
    pub async fn leave(&self, room_id: i64, connection_id: &str) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(members) = rooms.get_mut(&room_id) else {
            return false;
        };
        let removed = members.remove(connection_id).is_some();
        if members.is_empty() {
            rooms.remove(&room_id);
        }
        removed
    }

    /// Remove a connection from every room it has joined.
    ///
    /// Called on disconnect.
    pub async fn leave_all(&self, connection_id: &str) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }

    /// Check whether a connection is a member of a room.
    pub async fn is_member(&self, room_id: i64, connection_id: &str) -> bool {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .is_some_and(|members| members.contains_key(connection_id))
    }

    /// Broadcast a payload to every connection currently in a room.
    ///
    /// The originator receives the broadcast like everyone else. Returns
    /// the number of members the payload was handed to; connections whose
    /// channel has already closed are skipped.
    pub async fn broadcast(&self, room_id: i64, payload: T) -> usize {
        let rooms = self.rooms.read().await;
        let Some(members) = rooms.get(&room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for sender in members.values() {
            if sender.send(payload.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    /// Number of members currently in a room.
    pub async fn member_count(&self, room_id: i64) -> usize {
        self.rooms
            .read()
            .await
            .get(&room_id)
            .map_or(0, |members| members.len())
    }

    /// Number of rooms with at least one member.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

impl<T: Clone> Default for RoomRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
