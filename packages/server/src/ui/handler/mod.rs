//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{get_room_count, get_rooms, index};
pub use websocket::websocket_handler;
