//! Domain layer: the room/session state machine and its contracts.

pub mod command;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod notification;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use command::{Command, CommandError};
pub use entity::{
    ChatMessage, Connection, Room, RoomInfo, RoomSnapshot, Signal, SignalKind, ViewerRemoval,
};
pub use error::{MessagePushError, RegistryError, RoomError, ValueObjectError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use notification::Notification;
pub use registry::{
    ConnectionRegistry, DEFAULT_MAX_VIEWERS, Departure, JoinOutcome, RoomRegistry, SessionState,
};
pub use repository::{SessionGuard, SessionRepository};
pub use value_object::{
    DisplayName, DurableId, MessageContent, PeerAddress, ReactionKind, RoomId, SessionId,
    SessionIdFactory, Timestamp,
};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
