//! Signaling relay for host/viewer streaming rooms.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin greenroom-server
//! cargo run --bin greenroom-server -- --host 0.0.0.0 --port 3000 --max-viewers 20
//! ```

use std::sync::Arc;

use clap::Parser;
use greenroom_server::{
    config::ServerConfig,
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository},
    ui::{AppState, Server},
};
use greenroom_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    let config = ServerConfig::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. UseCases (AppState)
    // 4. Server

    // 1. Create Repository (in-memory session state)
    let repository = Arc::new(InMemorySessionRepository::with_max_viewers(
        config.max_viewers,
    ));
    tracing::info!("Rooms accept up to {} viewer(s)", config.max_viewers);

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::default());

    // 3. Create UseCases
    let app_state = AppState::new(repository, message_pusher, Arc::new(SystemClock));

    // 4. Create and run the server
    let server = Server::new(app_state);
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
