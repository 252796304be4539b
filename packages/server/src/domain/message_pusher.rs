//! MessagePusher trait 定義
//!
//! 接続中のクライアントへの通知送信を抽象化します。
//! 送信は fire-and-forget で、相手の受信確認は待ちません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{MessagePushError, Notification, SessionId};

/// クライアントへの送信チャンネル（シリアライズ済みのフレーム）
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信チャンネルを登録
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    /// クライアントの送信チャンネルを登録解除
    async fn unregister_client(&self, session_id: &SessionId);

    /// 特定のクライアントに通知を送信
    async fn push_to(
        &self,
        session_id: &SessionId,
        notification: &Notification,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントに通知を送信（一部の送信失敗は許容）
    async fn broadcast(
        &self,
        targets: &[SessionId],
        notification: &Notification,
    ) -> Result<(), MessagePushError>;
}
