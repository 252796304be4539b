//! Test fixtures shared by the use case tests.

use std::{collections::HashMap, sync::Arc};

use greenroom_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{MessagePusher, RoomId, SessionId, SessionRepository, Timestamp},
    infrastructure::{
        dto::websocket::ServerMessage, message_pusher::WebSocketMessagePusher,
        repository::InMemorySessionRepository,
    },
};

pub const FIXED_TIME: i64 = 1_700_000_000_000;

pub fn sid(value: &str) -> SessionId {
    SessionId::new(value.to_string()).unwrap()
}

pub fn rid(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

/// In-memory repository + WebSocket pusher with one receiver per participant.
pub struct Harness {
    pub repository: Arc<InMemorySessionRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
    pub clock: Arc<FixedClock>,
    receivers: HashMap<String, mpsc::UnboundedReceiver<String>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_viewers(crate::domain::DEFAULT_MAX_VIEWERS)
    }

    pub fn with_max_viewers(max_viewers: usize) -> Self {
        Self {
            repository: Arc::new(InMemorySessionRepository::with_max_viewers(max_viewers)),
            pusher: Arc::new(WebSocketMessagePusher::default()),
            clock: Arc::new(FixedClock::new(FIXED_TIME)),
            receivers: HashMap::new(),
        }
    }

    /// Registers a connection whose session id is `name`.
    pub async fn connect(&mut self, name: &str) -> SessionId {
        let session_id = sid(name);
        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut state = self.repository.begin().await;
            state
                .connections
                .connect(session_id.clone(), Timestamp::new(FIXED_TIME));
        }
        self.pusher.register_client(session_id.clone(), tx).await;
        self.receivers.insert(name.to_string(), rx);
        session_id
    }

    /// Everything `name` received since the last call.
    pub fn events(&mut self, name: &str) -> Vec<ServerMessage> {
        let mut events = Vec::new();
        if let Some(rx) = self.receivers.get_mut(name) {
            while let Ok(frame) = rx.try_recv() {
                events.push(serde_json::from_str(&frame).unwrap());
            }
        }
        events
    }

    pub fn event_names(&mut self, name: &str) -> Vec<String> {
        self.events(name).into_iter().map(|e| e.event).collect()
    }

    /// Discards everything received so far by every participant.
    pub fn clear(&mut self) {
        for rx in self.receivers.values_mut() {
            while rx.try_recv().is_ok() {}
        }
    }
}
