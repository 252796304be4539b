//! Conversion logic between DTOs and domain types.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{
    ChatMessage, Command, CommandError, DisplayName, DurableId, MessageContent, Notification,
    PeerAddress, ReactionKind, Room, RoomId, SessionId, SignalKind,
};
use crate::infrastructure::dto::{http as http_dto, websocket as dto};
use greenroom_shared::time::timestamp_to_rfc3339;

// ========================================
// DTO → Domain (inbound)
// ========================================

impl TryFrom<dto::ClientMessage> for Command {
    type Error = CommandError;

    fn try_from(message: dto::ClientMessage) -> Result<Self, Self::Error> {
        let dto::ClientMessage { event, data } = message;
        match event.as_str() {
            "identify" => identify_command(data),
            "create-room" => Ok(Command::CreateRoom {
                room_id: room_id_from(&data)?,
            }),
            "join-room" => Ok(Command::JoinRoom {
                room_id: room_id_from(&data)?,
            }),
            "host-streaming" => Ok(Command::HostStreaming {
                room_id: room_id_from(&data)?,
            }),
            "stop-streaming" => Ok(Command::StopStreaming {
                room_id: room_id_from(&data)?,
            }),
            "viewer-streaming" => Ok(Command::ViewerStreaming {
                room_id: room_id_from(&data)?,
            }),
            "request-stream" => Ok(Command::RequestStream),
            "leave-room" => Ok(Command::LeaveRoom),
            "respond-stream-request" => {
                let payload: dto::RespondStreamRequestPayload = payload_from(&event, data)?;
                Ok(Command::RespondStreamRequest {
                    viewer: address_from(&event, payload.viewer_id)?,
                    accepted: payload.accepted,
                })
            }
            "stop-viewer-stream" => {
                let viewer_id = match &data {
                    Value::String(id) => id.clone(),
                    Value::Object(map) => match map.get("viewerId") {
                        Some(Value::String(id)) => id.clone(),
                        _ => return Err(malformed(&event, "missing viewerId")),
                    },
                    _ => return Err(malformed(&event, "missing viewerId")),
                };
                Ok(Command::StopViewerStream {
                    viewer: address_from(&event, viewer_id)?,
                })
            }
            "offer" => signal_command(SignalKind::Offer, &event, data),
            "answer" => signal_command(SignalKind::Answer, &event, data),
            "ice-candidate" => signal_command(SignalKind::IceCandidate, &event, data),
            "chat-message" => {
                let payload: dto::ChatMessagePayload = payload_from(&event, data)?;
                Ok(Command::ChatMessage {
                    room_id: RoomId::new(payload.room_id)
                        .map_err(|e| malformed(&event, &e.to_string()))?,
                    content: MessageContent::new(payload.message)
                        .map_err(|e| malformed(&event, &e.to_string()))?,
                })
            }
            "reaction" => {
                let payload: dto::ReactionPayload = payload_from(&event, data)?;
                Ok(Command::Reaction {
                    room_id: RoomId::new(payload.room_id)
                        .map_err(|e| malformed(&event, &e.to_string()))?,
                    kind: ReactionKind::new(payload.kind)
                        .map_err(|e| malformed(&event, &e.to_string()))?,
                })
            }
            _ => Err(CommandError::UnknownEvent(event)),
        }
    }
}

fn malformed(event: &str, reason: &str) -> CommandError {
    CommandError::Malformed {
        event: event.to_string(),
        reason: reason.to_string(),
    }
}

fn payload_from<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, CommandError> {
    serde_json::from_value(data).map_err(|e| malformed(event, &e.to_string()))
}

fn address_from(event: &str, value: String) -> Result<PeerAddress, CommandError> {
    PeerAddress::new(value).map_err(|e| malformed(event, &e.to_string()))
}

/// Room ids arrive either bare (`"A"`) or wrapped (`{"roomId": "A"}`).
fn room_id_from(data: &Value) -> Result<RoomId, CommandError> {
    let raw = match data {
        Value::String(id) => id.clone(),
        Value::Object(map) => match map.get("roomId") {
            Some(Value::String(id)) => id.clone(),
            _ => return Err(CommandError::InvalidRoom("missing roomId".to_string())),
        },
        _ => return Err(CommandError::InvalidRoom("missing roomId".to_string())),
    };
    RoomId::new(raw).map_err(|e| CommandError::InvalidRoom(e.to_string()))
}

fn identify_command(data: Value) -> Result<Command, CommandError> {
    let payload: dto::IdentifyPayload = serde_json::from_value(data)
        .map_err(|e| CommandError::InvalidIdentify(e.to_string()))?;
    let durable_id = match payload.durable_id {
        Some(Value::String(id)) => {
            DurableId::new(id).map_err(|e| CommandError::InvalidIdentify(e.to_string()))?
        }
        _ => {
            return Err(CommandError::InvalidIdentify(
                "durableId must be a non-empty string".to_string(),
            ));
        }
    };
    Ok(Command::Identify {
        durable_id,
        display_name: payload.name.map(DisplayName::new).unwrap_or_default(),
    })
}

fn signal_command(kind: SignalKind, event: &str, data: Value) -> Result<Command, CommandError> {
    let payload: dto::SignalPayload = payload_from(event, data)?;
    let target = payload
        .target
        .ok_or_else(|| malformed(event, "missing target"))?;
    let body = match kind {
        SignalKind::Offer | SignalKind::Answer => payload.sdp,
        SignalKind::IceCandidate => payload.candidate,
    }
    .ok_or_else(|| malformed(event, "missing payload"))?;
    Ok(Command::Signal {
        kind,
        target: address_from(event, target)?,
        payload: body,
    })
}

// ========================================
// Domain → DTO (outbound)
// ========================================

fn ids(ids: &[SessionId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

impl From<&ChatMessage> for dto::ChatEntryData {
    fn from(message: &ChatMessage) -> Self {
        Self {
            sender_id: message.sender.as_str().to_string(),
            message: message.content.as_str().to_string(),
            timestamp: message.timestamp.value(),
        }
    }
}

impl TryFrom<&Notification> for dto::ServerMessage {
    type Error = serde_json::Error;

    fn try_from(notification: &Notification) -> Result<Self, Self::Error> {
        let data = match notification {
            Notification::Connected { session_id } => serde_json::to_value(dto::ConnectedData {
                session_id: session_id.as_str().to_string(),
            })?,
            Notification::Identified {
                session_id,
                durable_id,
                display_name,
            } => serde_json::to_value(dto::IdentifiedData {
                session_id: session_id.as_str().to_string(),
                durable_id: durable_id.as_str().to_string(),
                name: display_name.as_str().to_string(),
            })?,
            Notification::InvalidIdentify { reason } | Notification::InvalidRoom { reason } => {
                serde_json::to_value(dto::ReasonData {
                    reason: reason.clone(),
                })?
            }
            Notification::SocketIdInUse { durable_id } => {
                serde_json::to_value(dto::DurableIdData {
                    durable_id: durable_id.clone(),
                })?
            }
            Notification::RoomCreated { room_id }
            | Notification::RoomExists { room_id }
            | Notification::RoomFull { room_id }
            | Notification::RoomClosed { room_id } => serde_json::to_value(dto::RoomIdData {
                room_id: room_id.as_str().to_string(),
            })?,
            Notification::RoomJoined(snapshot) => serde_json::to_value(dto::RoomJoinedData {
                room_id: snapshot.room_id.as_str().to_string(),
                host_id: snapshot.host_id.as_str().to_string(),
                is_streaming: snapshot.is_streaming,
                viewer_count: snapshot.viewer_count,
                messages: snapshot.messages.iter().map(Into::into).collect(),
                approved_viewer_ids: ids(&snapshot.approved_viewer_ids),
            })?,
            Notification::RoomInfo(info) => serde_json::to_value(dto::RoomInfoData {
                host_id: info.host_id.as_str().to_string(),
                viewer_count: info.viewer_count,
                is_host_active: info.is_host_active,
                is_host_streaming: info.is_host_streaming,
                streaming_viewer_ids: ids(&info.streaming_viewer_ids),
                approved_viewer_ids: ids(&info.approved_viewer_ids),
            })?,
            Notification::UserJoined {
                viewer_id,
                display_name,
            }
            | Notification::IncomingStreamRequest {
                viewer_id,
                display_name,
            } => serde_json::to_value(dto::NamedViewerData {
                viewer_id: viewer_id.as_str().to_string(),
                name: display_name.as_str().to_string(),
            })?,
            Notification::UserLeft { viewer_id }
            | Notification::ViewerStartedStreaming { viewer_id }
            | Notification::ViewerStoppedStreaming { viewer_id } => {
                serde_json::to_value(dto::ViewerData {
                    viewer_id: viewer_id.as_str().to_string(),
                })?
            }
            Notification::HostLeft { host_id }
            | Notification::HostStartedStreaming { host_id }
            | Notification::HostStoppedStreaming { host_id } => {
                serde_json::to_value(dto::HostData {
                    host_id: host_id.as_str().to_string(),
                })?
            }
            Notification::StreamRequestResponse { accepted } => {
                serde_json::to_value(dto::StreamRequestResponseData {
                    accepted: *accepted,
                })?
            }
            Notification::Signal(signal) => {
                let mut data = serde_json::Map::new();
                data.insert(
                    signal.kind.payload_field().to_string(),
                    signal.payload.clone(),
                );
                data.insert(
                    "sender".to_string(),
                    Value::String(signal.sender.as_str().to_string()),
                );
                Value::Object(data)
            }
            Notification::NewMessage(message) => {
                serde_json::to_value(dto::ChatEntryData::from(message))?
            }
            Notification::Reaction { sender_id, kind } => {
                serde_json::to_value(dto::ReactionData {
                    sender_id: sender_id.as_str().to_string(),
                    kind: kind.as_str().to_string(),
                })?
            }
            Notification::Unauthorized { action } => {
                serde_json::to_value(dto::UnauthorizedData {
                    action: action.to_string(),
                })?
            }
        };

        Ok(Self {
            event: notification.event_name().to_string(),
            data,
        })
    }
}

impl From<&Room> for http_dto::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id().as_str().to_string(),
            viewer_count: room.viewers().len(),
            is_streaming: room.is_streaming(),
            host_id: room.host_id().as_str().to_string(),
            approved_viewer_ids: ids(room.approved_streamers()),
            created_at: timestamp_to_rfc3339(room.created_at().value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Signal, Timestamp};
    use serde_json::json;

    fn parse(frame: Value) -> Result<Command, CommandError> {
        let message: dto::ClientMessage = serde_json::from_value(frame).unwrap();
        Command::try_from(message)
    }

    #[test]
    fn test_room_id_accepts_bare_string_and_object() {
        // テスト項目: Room ID は文字列でもオブジェクトでも受け付ける
        // given (前提条件):
        let bare = json!({"event": "create-room", "data": "A"});
        let wrapped = json!({"event": "join-room", "data": {"roomId": "A"}});

        // when (操作):
        let bare = parse(bare);
        let wrapped = parse(wrapped);

        // then (期待する結果):
        let room_id = RoomId::new("A".to_string()).unwrap();
        assert_eq!(
            bare,
            Ok(Command::CreateRoom {
                room_id: room_id.clone()
            })
        );
        assert_eq!(wrapped, Ok(Command::JoinRoom { room_id }));
    }

    #[test]
    fn test_missing_room_id_is_invalid_room() {
        // テスト項目: Room ID が空・欠落・文字列以外の場合は InvalidRoom になる
        // given (前提条件):
        let frames = [
            json!({"event": "create-room", "data": ""}),
            json!({"event": "create-room"}),
            json!({"event": "host-streaming", "data": {"roomId": 42}}),
        ];

        for frame in frames {
            // when (操作):
            let result = parse(frame);

            // then (期待する結果):
            assert!(matches!(result, Err(CommandError::InvalidRoom(_))));
        }
    }

    #[test]
    fn test_identify_requires_string_durable_id() {
        // テスト項目: durableId が文字列でない identify は InvalidIdentify になる
        // given (前提条件):
        let valid = json!({"event": "identify", "data": {"durableId": "alice", "name": "Alice"}});
        let missing = json!({"event": "identify", "data": {"name": "Alice"}});
        let numeric = json!({"event": "identify", "data": {"durableId": 7}});

        // when (操作):
        let valid = parse(valid);
        let missing = parse(missing);
        let numeric = parse(numeric);

        // then (期待する結果):
        assert_eq!(
            valid,
            Ok(Command::Identify {
                durable_id: DurableId::new("alice".to_string()).unwrap(),
                display_name: DisplayName::new("Alice"),
            })
        );
        assert!(matches!(missing, Err(CommandError::InvalidIdentify(_))));
        assert!(matches!(numeric, Err(CommandError::InvalidIdentify(_))));
    }

    #[test]
    fn test_identify_without_name_is_anonymous() {
        // テスト項目: 名前なしの identify は "Anonymous" になる
        // given (前提条件):
        let frame = json!({"event": "identify", "data": {"durableId": "alice"}});

        // when (操作):
        let result = parse(frame).unwrap();

        // then (期待する結果):
        match result {
            Command::Identify { display_name, .. } => {
                assert_eq!(display_name.as_str(), "Anonymous")
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_signal_payload_is_kept_opaque() {
        // テスト項目: シグナルのペイロードは中身を解釈せずにそのまま保持される
        // given (前提条件):
        let candidate = json!({"candidate": "candidate:1 1 UDP 2122 10.0.0.1 5000 typ host", "sdpMid": "0"});
        let frame = json!({"event": "ice-candidate", "data": {"target": "v1", "candidate": candidate}});

        // when (操作):
        let result = parse(frame);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(Command::Signal {
                kind: SignalKind::IceCandidate,
                target: PeerAddress::new("v1".to_string()).unwrap(),
                payload: candidate,
            })
        );
    }

    #[test]
    fn test_signal_without_target_or_payload_is_malformed() {
        // テスト項目: target やペイロードのないシグナルは Malformed として破棄対象になる
        // given (前提条件):
        let no_target = json!({"event": "offer", "data": {"sdp": "x"}});
        let no_sdp = json!({"event": "answer", "data": {"target": "v1"}});

        // when (操作):
        let no_target = parse(no_target);
        let no_sdp = parse(no_sdp);

        // then (期待する結果):
        assert!(matches!(no_target, Err(CommandError::Malformed { .. })));
        assert!(matches!(no_sdp, Err(CommandError::Malformed { .. })));
    }

    #[test]
    fn test_empty_chat_message_is_malformed() {
        // テスト項目: 空のチャットメッセージは Malformed になる
        // given (前提条件):
        let frame = json!({"event": "chat-message", "data": {"roomId": "A", "message": ""}});

        // when (操作):
        let result = parse(frame);

        // then (期待する結果):
        assert!(matches!(result, Err(CommandError::Malformed { .. })));
    }

    #[test]
    fn test_unknown_event() {
        // テスト項目: 未知のイベント名は UnknownEvent になる
        // given (前提条件):
        let frame = json!({"event": "teleport", "data": {}});

        // when (操作):
        let result = parse(frame);

        // then (期待する結果):
        assert_eq!(result, Err(CommandError::UnknownEvent("teleport".to_string())));
    }

    #[test]
    fn test_signal_notification_tags_sender() {
        // テスト項目: 中継されるシグナルには sender が付与される
        // given (前提条件):
        let notification = Notification::Signal(Signal {
            kind: SignalKind::Offer,
            payload: json!("v=0"),
            sender: PeerAddress::new("v2".to_string()).unwrap(),
        });

        // when (操作):
        let message = dto::ServerMessage::try_from(&notification).unwrap();

        // then (期待する結果):
        assert_eq!(message.event, "offer");
        assert_eq!(message.data, json!({"sdp": "v=0", "sender": "v2"}));
    }

    #[test]
    fn test_new_message_notification_shape() {
        // テスト項目: new-message は senderId・message・timestamp を持つ
        // given (前提条件):
        let notification = Notification::NewMessage(ChatMessage::new(
            SessionId::new("s1".to_string()).unwrap(),
            MessageContent::new("hi".to_string()).unwrap(),
            Timestamp::new(1000),
        ));

        // when (操作):
        let message = dto::ServerMessage::try_from(&notification).unwrap();

        // then (期待する結果):
        assert_eq!(message.event, "new-message");
        assert_eq!(
            message.data,
            json!({"senderId": "s1", "message": "hi", "timestamp": 1000})
        );
    }
}
