//! UseCase: Room 参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 満員・存在しない Room への参加が拒否され、状態が変わらないことを保証
//! - 参加者に Room のスナップショットと現在の配信状態が届くことを保証
//! - ホストに user-joined、全員に room-info が届くことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：通常の参加、ホスト配信中の参加、再参加
//! - 異常系：存在しない Room、ホスト自身の参加、満員

use std::sync::Arc;

use crate::domain::{
    MessagePusher, Notification, RoomError, RoomId, SessionId, SessionRepository,
};

use super::{error::ProtocolError, notify};

/// Room 参加のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Room 参加を実行
    ///
    /// 通知の順序:
    /// 1. 以前の Room からの退出通知
    /// 2. 参加者へ `room-joined`
    /// 3. ホストへ `user-joined`
    /// 4. ホストが配信中なら参加者へ `host-started-streaming` と配信中の視聴者ごとの
    ///    `viewer-started-streaming`
    /// 5. 全メンバーへ `room-info`
    ///
    /// すでに視聴者である場合は 2 と 4 だけを再送する。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::InvalidRoom` - Room が存在しない、またはホスト自身の参加
    /// * `ProtocolError::RoomFull` - 視聴者数が上限に達している
    pub async fn execute(
        &self,
        session_id: &SessionId,
        room_id: RoomId,
    ) -> Result<(), ProtocolError> {
        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let outcome = match state.join_room(session_id, room_id.clone()) {
            Ok(outcome) => outcome,
            Err(RoomError::Full(id)) => {
                tracing::debug!("Room '{}' is full, rejecting '{}'", id, session_id);
                notify::push(pusher, session_id, Notification::RoomFull { room_id }).await;
                return Err(ProtocolError::RoomFull(id));
            }
            Err(e) => {
                let reason = e.to_string();
                notify::push(
                    pusher,
                    session_id,
                    Notification::InvalidRoom {
                        reason: reason.clone(),
                    },
                )
                .await;
                return Err(ProtocolError::InvalidRoom(reason));
            }
        };

        notify::announce_departure(pusher, outcome.previous).await;

        let display_name = state
            .connections
            .get(session_id)
            .map(|c| c.display_name.clone())
            .unwrap_or_default();
        let Some(room) = state.rooms.get(&outcome.room_id) else {
            return Err(ProtocolError::InvalidRoom(room_id.into_string()));
        };

        if outcome.rejoined {
            tracing::debug!("'{}' re-joined room '{}'", session_id, room.id());
        } else {
            tracing::info!(
                "'{}' joined room '{}' ({} viewer(s))",
                session_id,
                room.id(),
                room.viewers().len()
            );
        }

        notify::push(pusher, session_id, Notification::RoomJoined(room.snapshot())).await;
        if !outcome.rejoined {
            notify::push(
                pusher,
                room.host_id(),
                Notification::UserJoined {
                    viewer_id: session_id.clone(),
                    display_name,
                },
            )
            .await;
        }

        if room.is_streaming() {
            notify::push(
                pusher,
                session_id,
                Notification::HostStartedStreaming {
                    host_id: room.host_id().clone(),
                },
            )
            .await;
            for viewer_id in room.streaming_viewers() {
                notify::push(
                    pusher,
                    session_id,
                    Notification::ViewerStartedStreaming {
                        viewer_id: viewer_id.clone(),
                    },
                )
                .await;
            }
        }

        if !outcome.rejoined {
            notify::broadcast_room_info(pusher, room).await;
        }
        Ok(())
    }
}
