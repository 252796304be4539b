//! UseCase: 参加者接続処理と identify
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() / identify() メソッド
//! - 接続時の SessionId 採番、durable id の紐付け、保留シグナルの配送
//!
//! ### なぜこのテストが必要か
//! - durable id は同時に1つの接続にしか紐付かないことを保証する
//! - 再接続した参加者に、不在中のシグナルが送信順に一度だけ届くことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続、identify、再接続による保留シグナルの受信
//! - 異常系：使用中の durable id、別 ID での再 identify

use std::sync::Arc;

use greenroom_shared::time::Clock;

use crate::domain::{
    CommandError, DisplayName, DurableId, MessagePusher, Notification, PusherChannel,
    RegistryError, SessionId, SessionIdFactory, SessionRepository, Timestamp,
};

use super::{error::ProtocolError, notify};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn SessionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 接続時刻の取得元
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
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

    /// 参加者接続を実行
    ///
    /// 新しい SessionId を採番して Connection Registry と MessagePusher に登録し、
    /// `connected` を送信する。
    ///
    /// # Arguments
    ///
    /// * `sender` - クライアントへのメッセージ送信用チャンネル
    ///
    /// # Returns
    ///
    /// 採番した SessionId
    pub async fn execute(&self, sender: PusherChannel) -> SessionId {
        let session_id = SessionIdFactory::generate();
        let connected_at = Timestamp::new(self.clock.now_millis());

        let mut state = self.repository.begin().await;
        state.connections.connect(session_id.clone(), connected_at);
        self.message_pusher
            .register_client(session_id.clone(), sender)
            .await;
        notify::push(
            self.message_pusher.as_ref(),
            &session_id,
            Notification::Connected {
                session_id: session_id.clone(),
            },
        )
        .await;

        session_id
    }

    /// durable id を接続に紐付ける
    ///
    /// 成功すると `identified` を送信し、続けてその接続宛てに保留されていた
    /// シグナルを送信順に配送する。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::SocketIdInUse` - 別の接続がその durable id を使用中（`socket-id-in-use`）
    /// * `ProtocolError::InvalidIdentify` - この接続はすでに別の durable id を持つ（`invalid-identify`）
    pub async fn identify(
        &self,
        session_id: &SessionId,
        durable_id: DurableId,
        display_name: DisplayName,
    ) -> Result<(), ProtocolError> {
        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        match state.identify(session_id, durable_id.clone(), display_name.clone()) {
            Ok(pending) => {
                tracing::info!("Session '{}' identified as '{}'", session_id, durable_id);
                notify::push(
                    pusher,
                    session_id,
                    Notification::Identified {
                        session_id: session_id.clone(),
                        durable_id,
                        display_name,
                    },
                )
                .await;
                notify::deliver_signals(pusher, session_id, pending).await;
                Ok(())
            }
            Err(RegistryError::AlreadyBound(id)) => {
                notify::push(
                    pusher,
                    session_id,
                    Notification::SocketIdInUse {
                        durable_id: id.clone(),
                    },
                )
                .await;
                Err(ProtocolError::SocketIdInUse(id))
            }
            Err(e @ RegistryError::AlreadyIdentified(_)) => {
                notify::push(
                    pusher,
                    session_id,
                    Notification::InvalidIdentify {
                        reason: e.to_string(),
                    },
                )
                .await;
                Err(ProtocolError::InvalidIdentify(e.to_string()))
            }
            Err(RegistryError::UnknownSession(id)) => Err(ProtocolError::NotConnected(id)),
        }
    }

    /// 受信フレームの検証エラーを送信元に返す
    ///
    /// `invalid-room` / `invalid-identify` に対応するエラーだけを送信し、
    /// それ以外（不正な payload、未知のイベント）は何も送らない。
    pub async fn reject(&self, session_id: &SessionId, error: &CommandError) {
        let notification = match error {
            CommandError::InvalidRoom(reason) => Notification::InvalidRoom {
                reason: reason.clone(),
            },
            CommandError::InvalidIdentify(reason) => Notification::InvalidIdentify {
                reason: reason.clone(),
            },
            CommandError::Malformed { .. } | CommandError::UnknownEvent(_) => return,
        };
        notify::push(self.message_pusher.as_ref(), session_id, notification).await;
    }
}
