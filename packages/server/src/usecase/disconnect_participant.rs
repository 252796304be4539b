//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 切断時の Room 退出、接続情報と保留シグナルの破棄、MessagePusher からの登録解除
//!
//! ### なぜこのテストが必要か
//! - ホストの切断で Room が閉じられ、全視聴者に host-left / room-closed が届くことを保証
//! - 視聴者の切断でホストに user-left が届き、残りのメンバーに room-info が届くことを保証
//! - 切断後に durable id が再利用可能になることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：ホストの切断、視聴者（配信者を含む）の切断
//! - エッジケース：Room に参加していない接続の切断
//! - 異常系：存在しない接続の切断

use std::sync::Arc;

use crate::domain::{MessagePusher, SessionId, SessionRepository};

use super::{error::ProtocolError, notify};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// Room からの退出と接続情報の解放を1回の処理で行い、
    /// 退出に伴う通知を残りのメンバーに送信する。
    ///
    /// # Arguments
    ///
    /// * `session_id` - 切断した接続の SessionId
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 切断完了
    /// * `Err(ProtocolError::NotConnected)` - 接続情報が存在しない
    pub async fn execute(&self, session_id: &SessionId) -> Result<(), ProtocolError> {
        let mut state = self.repository.begin().await;

        // 1. Room からの退出と接続情報の解放
        let (connection, departure) = state.disconnect(session_id);

        // 2. MessagePusher から登録解除
        self.message_pusher.unregister_client(session_id).await;

        // 3. 退出に伴う通知
        notify::announce_departure(self.message_pusher.as_ref(), departure).await;

        match connection {
            Some(connection) => {
                tracing::info!(
                    "Session '{}' disconnected (durable id: {:?})",
                    session_id,
                    connection.durable_id.as_ref().map(|id| id.as_str())
                );
                Ok(())
            }
            None => Err(ProtocolError::NotConnected(session_id.as_str().to_string())),
        }
    }
}
