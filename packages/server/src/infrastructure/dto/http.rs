//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /Roomcount`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCountDto {
    pub status: String,
    pub active_rooms: usize,
}

/// `GET /rooms`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomListDto {
    pub status: String,
    pub rooms: Vec<RoomSummaryDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub viewer_count: usize,
    pub is_streaming: bool,
    pub host_id: String,
    pub approved_viewer_ids: Vec<String>,
    /// RFC 3339 (UTC)
    pub created_at: String,
}
