//! WebSocket frame DTOs.
//!
//! Every frame in both directions is `{"event": "<name>", "data": <value>}`.

use serde::{Deserialize, Serialize};

/// Frame received from a client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Frame sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMessage {
    pub event: String,
    pub data: serde_json::Value,
}

// ========================================
// Inbound payloads
// ========================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPayload {
    #[serde(default, alias = "id")]
    pub durable_id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondStreamRequestPayload {
    pub viewer_id: String,
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct SignalPayload {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub sdp: Option<serde_json::Value>,
    #[serde(default)]
    pub candidate: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub room_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionPayload {
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

// ========================================
// Outbound payloads
// ========================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedData {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifiedData {
    pub session_id: String,
    pub durable_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ReasonData {
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurableIdData {
    pub durable_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdData {
    pub room_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntryData {
    pub sender_id: String,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomJoinedData {
    pub room_id: String,
    pub host_id: String,
    pub is_streaming: bool,
    pub viewer_count: usize,
    pub messages: Vec<ChatEntryData>,
    pub approved_viewer_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfoData {
    pub host_id: String,
    pub viewer_count: usize,
    pub is_host_active: bool,
    pub is_host_streaming: bool,
    pub streaming_viewer_ids: Vec<String>,
    pub approved_viewer_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerData {
    pub viewer_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedViewerData {
    pub viewer_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostData {
    pub host_id: String,
}

#[derive(Debug, Serialize)]
pub struct StreamRequestResponseData {
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionData {
    pub sender_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct UnauthorizedData {
    pub action: String,
}
