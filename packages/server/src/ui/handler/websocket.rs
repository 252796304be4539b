//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{Stream, StreamExt},
};
use tokio::sync::{mpsc, oneshot};

use crate::{
    domain::{Command, CommandError, SessionId},
    infrastructure::dto::websocket::ClientMessage,
    ui::state::AppState,
    usecase::ProtocolError,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This function handles the outbound message flow: every notification addressed to this
/// connection (via rx channel) is written to its WebSocket in channel order.
///
/// # Arguments
///
/// * `rx` - Channel receiver for notifications addressed to this connection
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Use ConnectParticipantUseCase to handle connection
    // (register_client and `connected` are handled inside the UseCase)
    let session_id = state.connect_participant_usecase.execute(tx).await;
    tracing::info!("Session '{}' connected", session_id);

    // Spawn a task to receive messages from this client
    let (stop_tx, stop_rx) = oneshot::channel();
    let mut recv_task = tokio::spawn(receive_loop(
        receiver,
        stop_rx,
        state.clone(),
        session_id.clone(),
    ));

    // Spawn a task to push notifications to this client
    let mut send_task = pusher_loop(rx, sender);

    // If either task completes, stop the other. The receive loop is only ever
    // stopped between frames, never aborted mid-frame.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => {
            let _ = stop_tx.send(());
            if let Err(e) = recv_task.await {
                tracing::error!("Receive task for '{}' failed: {}", session_id, e);
            }
        }
    };

    // Use DisconnectParticipantUseCase to handle disconnection
    if let Err(e) = state
        .disconnect_participant_usecase
        .execute(&session_id)
        .await
    {
        tracing::warn!("Failed to disconnect '{}': {}", session_id, e);
    }
}

/// Handles inbound frames one at a time until the client goes away or `stop`
/// fires. `stop` is only observed between frames.
async fn receive_loop<S>(
    mut receiver: S,
    mut stop: oneshot::Receiver<()>,
    state: Arc<AppState>,
    session_id: SessionId,
) where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    loop {
        let msg = tokio::select! {
            biased;
            msg = receiver.next() => msg,
            _ = &mut stop => break,
        };
        let msg = match msg {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::error!("WebSocket error on '{}': {}", session_id, e);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                tracing::debug!("Received from '{}': {}", session_id, text);
                handle_text(&state, &session_id, text.as_str()).await;
            }
            Message::Ping(_) => {
                tracing::debug!("Received ping");
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Session '{}' requested close", session_id);
                break;
            }
            _ => {}
        }
    }
}

/// Parses one inbound text frame and dispatches it.
async fn handle_text(state: &AppState, session_id: &SessionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Dropping non-JSON frame from '{}': {}", session_id, e);
            return;
        }
    };

    // DTO → Domain Model
    let command = match Command::try_from(message) {
        Ok(command) => command,
        Err(e) => {
            reject_command(state, session_id, e).await;
            return;
        }
    };

    if let Err(e) = dispatch(state, session_id, command).await {
        match e {
            ProtocolError::NotInRoom | ProtocolError::UnknownViewer(_) => {
                tracing::debug!("Dropped event from '{}': {}", session_id, e);
            }
            _ => tracing::warn!("Rejected event from '{}': {}", session_id, e),
        }
    }
}

/// Answers a frame that could not become a [`Command`].
async fn reject_command(state: &AppState, session_id: &SessionId, error: CommandError) {
    match error {
        CommandError::Malformed { .. } | CommandError::UnknownEvent(_) => {
            tracing::warn!("Dropping frame from '{}': {}", session_id, error);
        }
        CommandError::InvalidRoom(_) | CommandError::InvalidIdentify(_) => {
            tracing::warn!("Rejecting frame from '{}': {}", session_id, error);
            state
                .connect_participant_usecase
                .reject(session_id, &error)
                .await;
        }
    }
}

/// Routes a command to its use case.
async fn dispatch(
    state: &AppState,
    session_id: &SessionId,
    command: Command,
) -> Result<(), ProtocolError> {
    match command {
        Command::Identify {
            durable_id,
            display_name,
        } => {
            state
                .connect_participant_usecase
                .identify(session_id, durable_id, display_name)
                .await
        }
        Command::CreateRoom { room_id } => {
            state.create_room_usecase.execute(session_id, room_id).await
        }
        Command::JoinRoom { room_id } => state.join_room_usecase.execute(session_id, room_id).await,
        Command::HostStreaming { room_id } => {
            state.host_streaming_usecase.start(session_id, &room_id).await
        }
        Command::StopStreaming { room_id } => {
            state.host_streaming_usecase.stop(session_id, &room_id).await
        }
        Command::RequestStream => state.stream_request_usecase.request(session_id).await,
        Command::RespondStreamRequest { viewer, accepted } => {
            state
                .stream_request_usecase
                .respond(session_id, &viewer, accepted)
                .await
        }
        Command::ViewerStreaming { room_id } => {
            state
                .viewer_streaming_usecase
                .start(session_id, &room_id)
                .await
        }
        Command::StopViewerStream { viewer } => {
            state.viewer_streaming_usecase.stop(session_id, &viewer).await
        }
        Command::Signal {
            kind,
            target,
            payload,
        } => state
            .relay_signal_usecase
            .execute(session_id, kind, target, payload)
            .await
            .map(|_| ()),
        Command::ChatMessage { room_id, content } => {
            state
                .send_message_usecase
                .chat(session_id, &room_id, content)
                .await
        }
        Command::Reaction { room_id, kind } => {
            state
                .send_message_usecase
                .react(session_id, &room_id, kind)
                .await
        }
        Command::LeaveRoom => state.leave_room_usecase.execute(session_id).await,
    }
}
