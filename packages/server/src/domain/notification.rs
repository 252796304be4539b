//! Outbound events produced by the session protocol.
//!
//! The infrastructure layer turns these into wire frames.

use super::{
    entity::{ChatMessage, RoomInfo, RoomSnapshot, Signal},
    value_object::{DisplayName, DurableId, ReactionKind, RoomId, SessionId},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// First frame of every connection.
    Connected { session_id: SessionId },
    Identified {
        session_id: SessionId,
        durable_id: DurableId,
        display_name: DisplayName,
    },
    InvalidIdentify { reason: String },
    SocketIdInUse { durable_id: String },
    RoomCreated { room_id: RoomId },
    InvalidRoom { reason: String },
    RoomExists { room_id: RoomId },
    RoomFull { room_id: RoomId },
    RoomJoined(RoomSnapshot),
    RoomInfo(RoomInfo),
    UserJoined {
        viewer_id: SessionId,
        display_name: DisplayName,
    },
    UserLeft { viewer_id: SessionId },
    HostLeft { host_id: SessionId },
    RoomClosed { room_id: RoomId },
    HostStartedStreaming { host_id: SessionId },
    HostStoppedStreaming { host_id: SessionId },
    ViewerStartedStreaming { viewer_id: SessionId },
    ViewerStoppedStreaming { viewer_id: SessionId },
    IncomingStreamRequest {
        viewer_id: SessionId,
        display_name: DisplayName,
    },
    StreamRequestResponse { accepted: bool },
    Signal(Signal),
    NewMessage(ChatMessage),
    Reaction {
        sender_id: SessionId,
        kind: ReactionKind,
    },
    /// The sender lacks the role the action needs.
    Unauthorized { action: &'static str },
}

impl Notification {
    /// Event name on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::Connected { .. } => "connected",
            Notification::Identified { .. } => "identified",
            Notification::InvalidIdentify { .. } => "invalid-identify",
            Notification::SocketIdInUse { .. } => "socket-id-in-use",
            Notification::RoomCreated { .. } => "room-created",
            Notification::InvalidRoom { .. } => "invalid-room",
            Notification::RoomExists { .. } => "room-exists",
            Notification::RoomFull { .. } => "room-full",
            Notification::RoomJoined(_) => "room-joined",
            Notification::RoomInfo(_) => "room-info",
            Notification::UserJoined { .. } => "user-joined",
            Notification::UserLeft { .. } => "user-left",
            Notification::HostLeft { .. } => "host-left",
            Notification::RoomClosed { .. } => "room-closed",
            Notification::HostStartedStreaming { .. } => "host-started-streaming",
            Notification::HostStoppedStreaming { .. } => "host-stopped-streaming",
            Notification::ViewerStartedStreaming { .. } => "viewer-started-streaming",
            Notification::ViewerStoppedStreaming { .. } => "viewer-stopped-streaming",
            Notification::IncomingStreamRequest { .. } => "incoming-stream-request",
            Notification::StreamRequestResponse { .. } => "stream-request-response",
            Notification::Signal(signal) => signal.kind.event_name(),
            Notification::NewMessage(_) => "new-message",
            Notification::Reaction { .. } => "reaction",
            Notification::Unauthorized { .. } => "unauthorized",
        }
    }
}
