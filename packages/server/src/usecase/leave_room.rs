//! UseCase: Room 退出処理
//!
//! 接続は維持したまま Room からだけ抜ける。通知内容は切断時と同じ。

use std::sync::Arc;

use crate::domain::{Departure, MessagePusher, SessionId, SessionRepository};

use super::{error::ProtocolError, notify};

/// Room 退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 退出を実行
    ///
    /// # Errors
    ///
    /// * `ProtocolError::NotInRoom` - Room に参加していない（何も送信しない）
    pub async fn execute(&self, session_id: &SessionId) -> Result<(), ProtocolError> {
        let mut state = self.repository.begin().await;
        let departure = state.depart(session_id);
        if departure == Departure::NotInRoom {
            return Err(ProtocolError::NotInRoom);
        }
        notify::announce_departure(self.message_pusher.as_ref(), departure).await;
        Ok(())
    }
}
