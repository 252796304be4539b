//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{RoomCountDto, RoomListDto, RoomSummaryDto},
    ui::state::AppState,
};

/// Liveness text
pub async fn index() -> &'static str {
    "Signaling server is running"
}

/// Number of active rooms
pub async fn get_room_count(State(state): State<Arc<AppState>>) -> Json<RoomCountDto> {
    let active_rooms = state.get_rooms_usecase.count().await;
    Json(RoomCountDto {
        status: "ok".to_string(),
        active_rooms,
    })
}

/// Active rooms ordered by id
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<RoomListDto> {
    let rooms = state.get_rooms_usecase.list().await;

    // Domain Model から DTO への変換
    let rooms: Vec<RoomSummaryDto> = rooms.iter().map(RoomSummaryDto::from).collect();

    Json(RoomListDto {
        status: "ok".to_string(),
        rooms,
    })
}
