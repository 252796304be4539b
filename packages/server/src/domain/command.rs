//! Inbound events, validated into one tagged union before dispatch.

use thiserror::Error;

use super::{
    entity::SignalKind,
    value_object::{DisplayName, DurableId, MessageContent, PeerAddress, ReactionKind, RoomId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Identify {
        durable_id: DurableId,
        display_name: DisplayName,
    },
    CreateRoom { room_id: RoomId },
    JoinRoom { room_id: RoomId },
    HostStreaming { room_id: RoomId },
    StopStreaming { room_id: RoomId },
    RequestStream,
    RespondStreamRequest { viewer: PeerAddress, accepted: bool },
    ViewerStreaming { room_id: RoomId },
    StopViewerStream { viewer: PeerAddress },
    Signal {
        kind: SignalKind,
        target: PeerAddress,
        payload: serde_json::Value,
    },
    ChatMessage {
        room_id: RoomId,
        content: MessageContent,
    },
    Reaction { room_id: RoomId, kind: ReactionKind },
    LeaveRoom,
}

/// Why an inbound frame did not become a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Answered with `invalid-identify`.
    #[error("invalid identify: {0}")]
    InvalidIdentify(String),

    /// Answered with `invalid-room`.
    #[error("invalid room: {0}")]
    InvalidRoom(String),

    /// Dropped.
    #[error("malformed '{event}' payload: {reason}")]
    Malformed { event: String, reason: String },

    /// Dropped.
    #[error("unknown event '{0}'")]
    UnknownEvent(String),
}
