//! Signaling relay for host/viewer streaming rooms.
//!
//! One host creates a room, viewers join it, and the server relays WebRTC
//! signaling (offer, answer, ICE candidates), chat and reactions between them
//! over WebSocket. Media never passes through the server.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
