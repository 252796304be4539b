//! UseCase: 承認済み視聴者の配信開始と、ホストによる配信停止

use std::sync::Arc;

use crate::domain::{
    MessagePusher, Notification, PeerAddress, RoomId, SessionId, SessionRepository,
};

use super::{error::ProtocolError, notify};

/// 視聴者配信のユースケース
pub struct ViewerStreamingUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ViewerStreamingUseCase {
    /// 新しい ViewerStreamingUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 視聴者の配信開始（`viewer-streaming`）
    ///
    /// 承認済みの視聴者だけが配信中になれる。成功すると Room 全体
    /// （ホストと視聴者）に `viewer-started-streaming` を送り、続けて `room-info` を送る。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::InvalidRoom` - Room が存在しない
    /// * `ProtocolError::Unauthorized` - 送信元が承認済みの視聴者ではない
    pub async fn start(&self, session_id: &SessionId, room_id: &RoomId) -> Result<(), ProtocolError> {
        const ACTION: &str = "viewer-streaming";

        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let Some(room) = state.rooms.get_mut(room_id) else {
            let reason = format!("room '{}' not found", room_id);
            notify::push(
                pusher,
                session_id,
                Notification::InvalidRoom {
                    reason: reason.clone(),
                },
            )
            .await;
            return Err(ProtocolError::InvalidRoom(reason));
        };
        if let Err(e) = room.start_viewer_stream(session_id) {
            tracing::warn!("Rejecting viewer-streaming in '{}': {}", room_id, e);
            notify::push(pusher, session_id, Notification::Unauthorized { action: ACTION }).await;
            return Err(ProtocolError::Unauthorized(ACTION));
        }

        tracing::info!("Viewer '{}' started streaming in room '{}'", session_id, room_id);
        notify::broadcast(
            pusher,
            &room.members(),
            Notification::ViewerStartedStreaming {
                viewer_id: session_id.clone(),
            },
        )
        .await;
        notify::broadcast_room_info(pusher, room).await;
        Ok(())
    }

    /// ホストによる視聴者の配信停止（`stop-viewer-stream`）
    ///
    /// 承認と配信中の両方を取り消し、Room 全体に `viewer-stopped-streaming` を送る。
    /// 承認されていない視聴者が指定された場合は何も変わらず、何も送信しない。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::Unauthorized` - 送信元がホストではない
    /// * `ProtocolError::UnknownViewer` - 指定された視聴者がホストの Room にいない（何も送信しない）
    pub async fn stop(&self, session_id: &SessionId, viewer: &PeerAddress) -> Result<(), ProtocolError> {
        const ACTION: &str = "stop-viewer-stream";

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
            .ok_or_else(|| ProtocolError::UnknownViewer(viewer.as_str().to_string()))?;
        let Some(room) = state.rooms.get_mut(&room_id) else {
            return Err(ProtocolError::InvalidRoom(room_id.into_string()));
        };
        if !room.is_viewer(&viewer_id) {
            return Err(ProtocolError::UnknownViewer(viewer.as_str().to_string()));
        }
        if !room.is_approved(&viewer_id) {
            tracing::debug!("Viewer '{}' holds no stream to stop in '{}'", viewer_id, room_id);
            return Ok(());
        }
        room.revoke_streamer(&viewer_id)
            .map_err(|_| ProtocolError::UnknownViewer(viewer.as_str().to_string()))?;

        tracing::info!("Host '{}' stopped the stream of '{}'", session_id, viewer_id);
        notify::broadcast(
            pusher,
            &room.members(),
            Notification::ViewerStoppedStreaming { viewer_id },
        )
        .await;
        notify::broadcast_room_info(pusher, room).await;
        Ok(())
    }
}
