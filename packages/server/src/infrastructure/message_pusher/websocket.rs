//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket の `UnboundedSender` を管理
//! - Notification を JSON フレームに変換して送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信は unbounded channel への投入のみで、ブロックしません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{MessagePushError, MessagePusher, Notification, PusherChannel, SessionId},
    infrastructure::dto::websocket::ServerMessage,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let clients = Arc::new(Mutex::new(HashMap::new()));
/// let pusher = WebSocketMessagePusher::new(clients.clone());
///
/// pusher.push_to(&session_id, &Notification::RoomCreated { room_id }).await?;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: SessionId
    /// Value: PusherChannel
    clients: Arc<Mutex<HashMap<SessionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    /// 新しい WebSocketMessagePusher を作成
    pub fn new(clients: Arc<Mutex<HashMap<SessionId, PusherChannel>>>) -> Self {
        Self { clients }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new(Arc::new(Mutex::new(HashMap::new())))
    }
}

/// Notification を送信用の JSON 文字列に変換
fn encode(notification: &Notification) -> Result<String, MessagePushError> {
    let message = ServerMessage::try_from(notification)
        .map_err(|e| MessagePushError::Serialization(e.to_string()))?;
    serde_json::to_string(&message).map_err(|e| MessagePushError::Serialization(e.to_string()))
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", session_id);
        clients.insert(session_id, sender);
    }

    async fn unregister_client(&self, session_id: &SessionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(session_id);
        tracing::debug!("Client '{}' unregistered from MessagePusher", session_id);
    }

    async fn push_to(
        &self,
        session_id: &SessionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = encode(notification)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(session_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(session_id.as_str().to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!(
            "Pushed '{}' to client '{}'",
            notification.event_name(),
            session_id
        );
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[SessionId],
        notification: &Notification,
    ) -> Result<(), MessagePushError> {
        let frame = encode(notification)?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(target) {
                // ブロードキャストでは一部の送信失敗を許容
                Some(sender) => {
                    if let Err(e) = sender.send(frame.clone()) {
                        tracing::warn!("Failed to push message to client '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                }
            }
        }
        tracing::debug!(
            "Broadcasted '{}' to {} client(s)",
            notification.event_name(),
            targets.len()
        );

        Ok(())
    }
}
