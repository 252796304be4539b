//! Room Registry, Connection Registry and the session state that owns both.
//!
//! Everything here is synchronous. Callers get exclusive access through
//! [`SessionRepository`](super::SessionRepository), so one inbound event always
//! observes and leaves a consistent state.

use std::collections::{HashMap, HashSet, VecDeque};

use super::{
    entity::{Connection, Room, RoomInfo, Signal, ViewerRemoval},
    error::{RegistryError, RoomError},
    value_object::{DisplayName, DurableId, RoomId, SessionId, Timestamp},
};

/// Default room capacity (`MAX_VIEWERS`).
pub const DEFAULT_MAX_VIEWERS: usize = 10;

/// Number of released session ids remembered so late signals to them are dropped.
const RELEASED_HISTORY: usize = 4096;

/// All active rooms.
#[derive(Debug, Clone)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
    max_viewers: usize,
}

impl RoomRegistry {
    pub fn new(max_viewers: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            max_viewers,
        }
    }

    pub fn max_viewers(&self) -> usize {
        self.max_viewers
    }

    pub fn create(
        &mut self,
        room_id: RoomId,
        host_id: SessionId,
        created_at: Timestamp,
    ) -> Result<&Room, RoomError> {
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists(room_id.into_string()));
        }
        let room = Room::new(room_id.clone(), host_id, created_at);
        Ok(self.rooms.entry(room_id).or_insert(room))
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    pub fn add_viewer(&mut self, room_id: &RoomId, session_id: SessionId) -> Result<(), RoomError> {
        let max_viewers = self.max_viewers;
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.as_str().to_string()))?;
        room.add_viewer(session_id, max_viewers)
    }

    /// Idempotent; unknown rooms count as "nothing removed".
    pub fn remove_viewer(&mut self, room_id: &RoomId, session_id: &SessionId) -> ViewerRemoval {
        self.rooms
            .get_mut(room_id)
            .map(|room| room.remove_viewer(session_id))
            .unwrap_or_default()
    }

    pub fn destroy(&mut self, room_id: &RoomId) -> Option<Room> {
        self.rooms.remove(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Rooms ordered by id.
    pub fn list(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id().cmp(b.id()));
        rooms
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VIEWERS)
    }
}

/// Live connections, durable-id bindings and the pending-signal queues.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<SessionId, Connection>,
    bindings: HashMap<DurableId, SessionId>,
    /// Keyed by the raw target address; entries carry a global sequence number
    /// so queues of one connection can be merged back into send order.
    pending: HashMap<String, VecDeque<(u64, Signal)>>,
    next_seq: u64,
    /// Recently released session ids, oldest first.
    released: VecDeque<SessionId>,
    released_lookup: HashSet<SessionId>,
}

impl ConnectionRegistry {
    pub fn connect(&mut self, session_id: SessionId, connected_at: Timestamp) -> &Connection {
        self.connections
            .entry(session_id.clone())
            .or_insert_with(|| Connection::new(session_id, connected_at))
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Connection> {
        self.connections.get(session_id)
    }

    pub fn get_mut(&mut self, session_id: &SessionId) -> Option<&mut Connection> {
        self.connections.get_mut(session_id)
    }

    /// Binds `durable_id` to a live connection.
    ///
    /// Re-binding the id a connection already holds succeeds without change.
    /// A durable id may not shadow the session id of another live connection.
    pub fn bind(&mut self, durable_id: DurableId, session_id: &SessionId) -> Result<(), RegistryError> {
        if let Some(owner) = self.bindings.get(&durable_id)
            && owner != session_id
        {
            return Err(RegistryError::AlreadyBound(durable_id.into_string()));
        }
        if durable_id.as_str() != session_id.as_str()
            && self.connections.contains_key(durable_id.as_str())
        {
            return Err(RegistryError::AlreadyBound(durable_id.into_string()));
        }
        let connection = self
            .connections
            .get_mut(session_id)
            .ok_or_else(|| RegistryError::UnknownSession(session_id.as_str().to_string()))?;
        if let Some(current) = &connection.durable_id {
            if current == &durable_id {
                return Ok(());
            }
            return Err(RegistryError::AlreadyIdentified(
                current.as_str().to_string(),
            ));
        }
        connection.durable_id = Some(durable_id.clone());
        self.bindings.insert(durable_id, session_id.clone());
        Ok(())
    }

    /// Looks a live connection up by session id, then by bound durable id.
    pub fn resolve(&self, address: &str) -> Option<SessionId> {
        self.connections
            .get(address)
            .map(|connection| connection.session_id.clone())
            .or_else(|| self.bindings.get(address).cloned())
    }

    /// Removes a connection, its durable-id binding and every queue addressed
    /// to it. Queued signals are discarded, never delivered.
    pub fn release(&mut self, session_id: &SessionId) -> Option<Connection> {
        let connection = self.connections.remove(session_id)?;
        self.pending.remove(session_id.as_str());
        if let Some(durable_id) = &connection.durable_id {
            self.bindings.remove(durable_id);
            self.pending.remove(durable_id.as_str());
        }
        if self.released_lookup.insert(session_id.clone()) {
            self.released.push_back(session_id.clone());
        }
        while self.released.len() > RELEASED_HISTORY {
            if let Some(oldest) = self.released.pop_front() {
                self.released_lookup.remove(&oldest);
            }
        }
        Some(connection)
    }

    /// Whether `address` is the session id of a connection that already closed.
    ///
    /// Session ids are never reissued, so a queue for one could never drain.
    pub fn is_released(&self, address: &str) -> bool {
        self.released_lookup.contains(address)
    }

    pub fn enqueue(&mut self, target: &str, signal: Signal) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending
            .entry(target.to_string())
            .or_default()
            .push_back((seq, signal));
    }

    /// Takes every queued entry for exactly this address, oldest first.
    pub fn drain(&mut self, address: &str) -> Vec<Signal> {
        self.pending
            .remove(address)
            .map(|queue| queue.into_iter().map(|(_, signal)| signal).collect())
            .unwrap_or_default()
    }

    /// Takes every entry queued for either address of a live connection, in
    /// the order they were enqueued.
    pub fn drain_connection(&mut self, session_id: &SessionId) -> Vec<Signal> {
        let mut entries: Vec<(u64, Signal)> = self
            .pending
            .remove(session_id.as_str())
            .map(Vec::from)
            .unwrap_or_default();
        if let Some(durable_id) = self
            .connections
            .get(session_id)
            .and_then(|c| c.durable_id.as_ref())
            && let Some(queue) = self.pending.remove(durable_id.as_str())
        {
            entries.extend(queue);
        }
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, signal)| signal).collect()
    }

    pub fn pending_count(&self, address: &str) -> usize {
        self.pending.get(address).map_or(0, VecDeque::len)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Derived effects of a participant leaving its room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    /// The participant was not in a room.
    NotInRoom,
    /// The host left; the room is gone and its viewers were detached.
    RoomClosed { room: Room },
    /// A viewer left a room that stays open.
    ViewerLeft {
        room_id: RoomId,
        viewer_id: SessionId,
        host_id: SessionId,
        was_streamer: bool,
        remaining_members: Vec<SessionId>,
        info: RoomInfo,
    },
}

/// Result of a successful join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Effects of leaving the previous room, if the joiner was elsewhere.
    pub previous: Departure,
    pub room_id: RoomId,
    /// The joiner was already a viewer of this room; nothing changed.
    pub rejoined: bool,
}

/// The whole mutable state of the server.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub rooms: RoomRegistry,
    pub connections: ConnectionRegistry,
}

impl SessionState {
    pub fn new(max_viewers: usize) -> Self {
        Self {
            rooms: RoomRegistry::new(max_viewers),
            connections: ConnectionRegistry::default(),
        }
    }

    /// Room the session currently belongs to.
    pub fn room_of(&self, session_id: &SessionId) -> Option<&Room> {
        let room_id = self.connections.get(session_id)?.room_id.as_ref()?;
        self.rooms.get(room_id)
    }

    /// Binds the durable id, updates the display name and takes every signal
    /// queued for the connection.
    pub fn identify(
        &mut self,
        session_id: &SessionId,
        durable_id: DurableId,
        display_name: DisplayName,
    ) -> Result<Vec<Signal>, RegistryError> {
        self.connections.bind(durable_id, session_id)?;
        if let Some(connection) = self.connections.get_mut(session_id) {
            connection.display_name = display_name;
        }
        Ok(self.connections.drain_connection(session_id))
    }

    /// Creates a room hosted by `session_id`, leaving its current room first.
    ///
    /// Nothing changes when the id is already taken.
    pub fn create_room(
        &mut self,
        session_id: &SessionId,
        room_id: RoomId,
        created_at: Timestamp,
    ) -> Result<Departure, RoomError> {
        if self.rooms.get(&room_id).is_some() {
            return Err(RoomError::AlreadyExists(room_id.into_string()));
        }
        let previous = self.depart(session_id);
        self.rooms
            .create(room_id.clone(), session_id.clone(), created_at)?;
        if let Some(connection) = self.connections.get_mut(session_id) {
            connection.room_id = Some(room_id);
        }
        Ok(previous)
    }

    /// Adds `session_id` as a viewer, leaving its current room first.
    ///
    /// Capacity and existence are checked before anything is touched, so a
    /// rejected join leaves the joiner where it was.
    pub fn join_room(
        &mut self,
        session_id: &SessionId,
        room_id: RoomId,
    ) -> Result<JoinOutcome, RoomError> {
        let room = self
            .rooms
            .get(&room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.as_str().to_string()))?;
        if room.is_host(session_id) {
            return Err(RoomError::IsHost(session_id.as_str().to_string()));
        }
        if room.is_viewer(session_id) {
            return Ok(JoinOutcome {
                previous: Departure::NotInRoom,
                room_id,
                rejoined: true,
            });
        }
        if room.viewers().len() >= self.rooms.max_viewers() {
            return Err(RoomError::Full(room_id.into_string()));
        }

        let previous = self.depart(session_id);
        self.rooms.add_viewer(&room_id, session_id.clone())?;
        if let Some(connection) = self.connections.get_mut(session_id) {
            connection.room_id = Some(room_id.clone());
        }
        Ok(JoinOutcome {
            previous,
            room_id,
            rejoined: false,
        })
    }

    /// Removes the session from its room. Calling it again is a no-op.
    pub fn depart(&mut self, session_id: &SessionId) -> Departure {
        let Some(room_id) = self
            .connections
            .get_mut(session_id)
            .and_then(|c| c.room_id.take())
        else {
            return Departure::NotInRoom;
        };
        let Some(room) = self.rooms.get(&room_id) else {
            return Departure::NotInRoom;
        };

        if room.is_host(session_id) {
            let Some(room) = self.rooms.destroy(&room_id) else {
                return Departure::NotInRoom;
            };
            for viewer_id in room.viewers() {
                if let Some(viewer) = self.connections.get_mut(viewer_id)
                    && viewer.room_id.as_ref() == Some(&room_id)
                {
                    viewer.room_id = None;
                }
            }
            return Departure::RoomClosed { room };
        }

        let removal = self.rooms.remove_viewer(&room_id, session_id);
        match self.rooms.get(&room_id) {
            Some(room) if removal.removed => Departure::ViewerLeft {
                room_id: room_id.clone(),
                viewer_id: session_id.clone(),
                host_id: room.host_id().clone(),
                was_streamer: removal.was_streamer,
                remaining_members: room.members(),
                info: room.info(),
            },
            _ => Departure::NotInRoom,
        }
    }

    /// Disconnect as one transaction: leave the room, then release the
    /// connection record with its binding and queues.
    pub fn disconnect(&mut self, session_id: &SessionId) -> (Option<Connection>, Departure) {
        let departure = self.depart(session_id);
        let connection = self.connections.release(session_id);
        (connection, departure)
    }
}
