//! UseCase: チャットメッセージとリアクションの送信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::chat() / react() メソッド
//! - メッセージ履歴への追加と Room 全体へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 送信者を含む Room の全メンバーにメッセージが届くことを保証
//! - Room のメンバーでない接続からのメッセージが破棄されることを保証
//! - 後から参加した視聴者が履歴を受け取れるよう、チャットだけが履歴に残ることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：チャット送信、リアクション送信
//! - 異常系：参加していない Room 宛てのメッセージ

use std::sync::Arc;

use greenroom_shared::time::Clock;

use crate::domain::{
    ChatMessage, MessageContent, MessagePusher, Notification, ReactionKind, Room, RoomId,
    SessionId, SessionRepository, SessionState, Timestamp,
};

use super::{error::ProtocolError, notify};

/// チャット・リアクション送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// タイムスタンプの取得元
    clock: Arc<dyn Clock>,
}

/// 送信元がメンバーである Room を取得
fn member_room<'a>(
    state: &'a mut SessionState,
    session_id: &SessionId,
    room_id: &RoomId,
) -> Result<&'a mut Room, ProtocolError> {
    state
        .rooms
        .get_mut(room_id)
        .filter(|room| room.is_member(session_id))
        .ok_or(ProtocolError::NotInRoom)
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// チャットメッセージを送信（`chat-message`）
    ///
    /// Room の履歴に追加し、送信者を含む全メンバーに `new-message` を送る。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::NotInRoom` - 送信元がその Room のメンバーではない（何も送信しない）
    pub async fn chat(
        &self,
        session_id: &SessionId,
        room_id: &RoomId,
        content: MessageContent,
    ) -> Result<(), ProtocolError> {
        let timestamp = Timestamp::new(self.clock.now_millis());
        let mut state = self.repository.begin().await;

        let room = member_room(&mut state, session_id, room_id)?;
        let message = ChatMessage::new(session_id.clone(), content, timestamp);
        room.add_message(message.clone());
        tracing::debug!("Chat message from '{}' in room '{}'", session_id, room_id);

        notify::broadcast(
            self.message_pusher.as_ref(),
            &room.members(),
            Notification::NewMessage(message),
        )
        .await;
        Ok(())
    }

    /// リアクションを送信（`reaction`）
    ///
    /// 履歴には残さず、送信者を含む全メンバーに `reaction` を送る。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::NotInRoom` - 送信元がその Room のメンバーではない（何も送信しない）
    pub async fn react(
        &self,
        session_id: &SessionId,
        room_id: &RoomId,
        kind: ReactionKind,
    ) -> Result<(), ProtocolError> {
        let mut state = self.repository.begin().await;

        let room = member_room(&mut state, session_id, room_id)?;
        tracing::debug!(
            "Reaction '{}' from '{}' in room '{}'",
            kind,
            session_id,
            room_id
        );
        notify::broadcast(
            self.message_pusher.as_ref(),
            &room.members(),
            Notification::Reaction {
                sender_id: session_id.clone(),
                kind,
            },
        )
        .await;
        Ok(())
    }
}
