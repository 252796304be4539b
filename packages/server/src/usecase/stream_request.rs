//! UseCase: 視聴者からの配信リクエストとホストの応答
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - StreamRequestUseCase::request() / respond() メソッド
//!
//! ### なぜこのテストが必要か
//! - リクエストがホストにだけ届き、承認がホストにしかできないことを保証
//! - 承認時に視聴者宛てに保留されていたシグナルが配送されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：リクエスト → 承認、リクエスト → 拒否
//! - 異常系：Room 外からのリクエスト、ホスト以外の応答、別 Room の視聴者への応答

use std::sync::Arc;

use crate::domain::{MessagePusher, Notification, PeerAddress, SessionId, SessionRepository};

use super::{error::ProtocolError, notify};

/// 配信リクエストのユースケース
pub struct StreamRequestUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl StreamRequestUseCase {
    /// 新しい StreamRequestUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 配信リクエスト（`request-stream`）
    ///
    /// 送信元が現在の視聴者であれば、ホストに `incoming-stream-request` を送る。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::Unauthorized` - 送信元がどの Room の視聴者でもない
    pub async fn request(&self, session_id: &SessionId) -> Result<(), ProtocolError> {
        const ACTION: &str = "request-stream";

        let state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let host_id = match state.room_of(session_id) {
            Some(room) if room.is_viewer(session_id) => room.host_id().clone(),
            _ => {
                notify::push(pusher, session_id, Notification::Unauthorized { action: ACTION })
                    .await;
                return Err(ProtocolError::Unauthorized(ACTION));
            }
        };
        let display_name = state
            .connections
            .get(session_id)
            .map(|c| c.display_name.clone())
            .unwrap_or_default();

        tracing::info!("Viewer '{}' requested to stream", session_id);
        notify::push(
            pusher,
            &host_id,
            Notification::IncomingStreamRequest {
                viewer_id: session_id.clone(),
                display_name,
            },
        )
        .await;
        Ok(())
    }

    /// 配信リクエストへの応答（`respond-stream-request`）
    ///
    /// 承認時は視聴者を承認済み配信者に加え、`stream-request-response` を送信し、
    /// その視聴者宛てに保留されていたシグナルを配送してから `room-info` を送信する。
    /// 拒否時は視聴者に通知するだけで状態は変えない。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::Unauthorized` - 送信元がホストではない
    /// * `ProtocolError::UnknownViewer` - 指定された視聴者がホストの Room にいない（何も送信しない）
    pub async fn respond(
        &self,
        session_id: &SessionId,
        viewer: &PeerAddress,
        accepted: bool,
    ) -> Result<(), ProtocolError> {
        const ACTION: &str = "respond-stream-request";

        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let room_id = match state.room_of(session_id) {
            Some(room) if room.is_host(session_id) => room.id().clone(),
            _ => {
                notify::push(pusher, session_id, Notification::Unauthorized { action: ACTION })
                    .await;
                return Err(ProtocolError::Unauthorized(ACTION));
            }
        };
        let viewer_id = state
            .connections
            .resolve(viewer.as_str())
            .filter(|id| {
                state
                    .rooms
                    .get(&room_id)
                    .is_some_and(|room| room.is_viewer(id))
            })
            .ok_or_else(|| ProtocolError::UnknownViewer(viewer.as_str().to_string()))?;

        if !accepted {
            tracing::info!("Host '{}' rejected stream request of '{}'", session_id, viewer_id);
            notify::push(
                pusher,
                &viewer_id,
                Notification::StreamRequestResponse { accepted: false },
            )
            .await;
            return Ok(());
        }

        let Some(room) = state.rooms.get_mut(&room_id) else {
            return Err(ProtocolError::InvalidRoom(room_id.into_string()));
        };
        room.approve_streamer(&viewer_id)
            .map_err(|e| ProtocolError::UnknownViewer(e.to_string()))?;
        tracing::info!("Host '{}' approved '{}' to stream", session_id, viewer_id);

        notify::push(
            pusher,
            &viewer_id,
            Notification::StreamRequestResponse { accepted: true },
        )
        .await;
        let pending = state.connections.drain_connection(&viewer_id);
        notify::deliver_signals(pusher, &viewer_id, pending).await;
        if let Some(room) = state.rooms.get(&room_id) {
            notify::broadcast_room_info(pusher, room).await;
        }
        Ok(())
    }
}
