//! UseCase: ホストの配信開始・停止

use std::sync::Arc;

use crate::domain::{MessagePusher, Notification, RoomId, SessionId, SessionRepository};

use super::{error::ProtocolError, notify};

/// ホスト配信状態のユースケース
pub struct HostStreamingUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl HostStreamingUseCase {
    /// 新しい HostStreamingUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 配信開始（`host-streaming`）
    pub async fn start(&self, session_id: &SessionId, room_id: &RoomId) -> Result<(), ProtocolError> {
        self.set_streaming(session_id, room_id, true).await
    }

    /// 配信停止（`stop-streaming`）
    pub async fn stop(&self, session_id: &SessionId, room_id: &RoomId) -> Result<(), ProtocolError> {
        self.set_streaming(session_id, room_id, false).await
    }

    /// 配信状態を更新し、全視聴者に通知した後で `room-info` を送信する
    ///
    /// # Errors
    ///
    /// * `ProtocolError::InvalidRoom` - Room が存在しない
    /// * `ProtocolError::Unauthorized` - 送信元がホストではない
    async fn set_streaming(
        &self,
        session_id: &SessionId,
        room_id: &RoomId,
        streaming: bool,
    ) -> Result<(), ProtocolError> {
        let action = if streaming {
            "host-streaming"
        } else {
            "stop-streaming"
        };
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
        if !room.is_host(session_id) {
            tracing::warn!("'{}' is not the host of '{}', rejecting {}", session_id, room_id, action);
            notify::push(pusher, session_id, Notification::Unauthorized { action }).await;
            return Err(ProtocolError::Unauthorized(action));
        }

        room.set_host_streaming(streaming);
        tracing::info!("Host '{}' {} in room '{}'", session_id, action, room_id);

        let host_id = room.host_id().clone();
        let notification = if streaming {
            Notification::HostStartedStreaming { host_id }
        } else {
            Notification::HostStoppedStreaming { host_id }
        };
        notify::broadcast(pusher, room.viewers(), notification).await;
        notify::broadcast_room_info(pusher, room).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockMessagePusher, Timestamp};
    use crate::infrastructure::repository::InMemorySessionRepository;
    use crate::usecase::test_support::{Harness, rid, sid};

    fn create_usecase(harness: &Harness) -> HostStreamingUseCase {
        HostStreamingUseCase::new(harness.repository.clone(), harness.pusher.clone())
    }

    async fn setup_room(harness: &mut Harness) {
        for name in ["host", "v1", "v2"] {
            harness.connect(name).await;
        }
        let mut state = harness.repository.begin().await;
        state
            .create_room(&sid("host"), rid("A"), Timestamp::new(0))
            .unwrap();
        state.join_room(&sid("v1"), rid("A")).unwrap();
        state.join_room(&sid("v2"), rid("A")).unwrap();
    }

    #[tokio::test]
    async fn test_host_start_and_stop_streaming() {
        // テスト項目: ホストの配信開始・停止が全視聴者に届き、その後に room-info が届く
        // given (前提条件):
        let mut harness = Harness::new();
        setup_room(&mut harness).await;
        let usecase = create_usecase(&harness);

        // when (操作):
        usecase.start(&sid("host"), &rid("A")).await.unwrap();
        usecase.stop(&sid("host"), &rid("A")).await.unwrap();

        // then (期待する結果):
        for viewer in ["v1", "v2"] {
            let events = harness.events(viewer);
            let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
            assert_eq!(
                names,
                vec![
                    "host-started-streaming",
                    "room-info",
                    "host-stopped-streaming",
                    "room-info"
                ]
            );
            assert_eq!(events[0].data["hostId"], "host");
            assert_eq!(events[1].data["isHostStreaming"], true);
            assert_eq!(events[3].data["isHostStreaming"], false);
        }
        assert_eq!(harness.event_names("host"), vec!["room-info", "room-info"]);
    }

    #[tokio::test]
    async fn test_viewer_cannot_toggle_host_streaming() {
        // テスト項目: ホスト以外の配信開始は unauthorized になり、状態は変わらない
        // given (前提条件):
        let mut harness = Harness::new();
        setup_room(&mut harness).await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let result = usecase.start(&sid("v1"), &rid("A")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ProtocolError::Unauthorized("host-streaming")));
        let events = harness.events("v1");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "unauthorized");
        assert_eq!(events[0].data["action"], "host-streaming");
        assert!(harness.event_names("v2").is_empty());
        let state = harness.repository.begin().await;
        assert!(!state.rooms.get(&rid("A")).unwrap().is_streaming());
    }

    #[tokio::test]
    async fn test_streaming_unknown_room() {
        // テスト項目: 存在しない Room への配信開始は invalid-room を送信元にだけ返す
        // given (前提条件):
        let repository = Arc::new(InMemorySessionRepository::with_max_viewers(10));
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|target, notification| {
                target.as_str() == "host"
                    && matches!(notification, Notification::InvalidRoom { .. })
            })
            .times(1)
            .returning(|_, _| Ok(()));
        pusher.expect_broadcast().times(0);
        let usecase = HostStreamingUseCase::new(repository, Arc::new(pusher));

        // when (操作):
        let result = usecase.start(&sid("host"), &rid("missing")).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ProtocolError::InvalidRoom(_))));
    }
}
