//! UseCase: Room 作成処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - Room ID の重複が拒否され、既存の Room が変更されないことを保証
//! - 作成者がホストとして登録され、以前の Room からは退出することを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規作成、別 Room の視聴者による作成
//! - 異常系：重複 ID

use std::sync::Arc;

use greenroom_shared::time::Clock;

use crate::domain::{
    MessagePusher, Notification, RoomError, RoomId, SessionId, SessionRepository, Timestamp,
};

use super::{error::ProtocolError, notify};

/// Room 作成のユースケース
pub struct CreateRoomUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl CreateRoomUseCase {
    /// 新しい CreateRoomUseCase を作成
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

    /// Room 作成を実行
    ///
    /// 送信元が別の Room にいる場合は先に退出させる。
    /// 作成者には `room-created` を返し、続けて `room-info` を送信する。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::RoomExists` - 同じ ID の Room が存在する（`room-exists` を返す）
    pub async fn execute(
        &self,
        session_id: &SessionId,
        room_id: RoomId,
    ) -> Result<(), ProtocolError> {
        let created_at = Timestamp::new(self.clock.now_millis());
        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let previous = match state.create_room(session_id, room_id.clone(), created_at) {
            Ok(previous) => previous,
            Err(RoomError::AlreadyExists(id)) => {
                tracing::debug!("Room '{}' already exists, rejecting '{}'", id, session_id);
                notify::push(pusher, session_id, Notification::RoomExists { room_id }).await;
                return Err(ProtocolError::RoomExists(id));
            }
            Err(e) => return Err(ProtocolError::InvalidRoom(e.to_string())),
        };

        notify::announce_departure(pusher, previous).await;

        tracing::info!("Room '{}' created by '{}'", room_id, session_id);
        notify::push(
            pusher,
            session_id,
            Notification::RoomCreated {
                room_id: room_id.clone(),
            },
        )
        .await;
        if let Some(room) = state.rooms.get(&room_id) {
            notify::broadcast_room_info(pusher, room).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{FIXED_TIME, Harness, rid, sid};

    fn create_usecase(harness: &Harness) -> CreateRoomUseCase {
        CreateRoomUseCase::new(
            harness.repository.clone(),
            harness.pusher.clone(),
            harness.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_create_room_success() {
        // テスト項目: Room を作成すると room-created と room-info が作成者に届く
        // given (前提条件):
        let mut harness = Harness::new();
        let host = harness.connect("host").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let result = usecase.execute(&host, rid("A")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let events = harness.events("host");
        assert_eq!(events[0].event, "room-created");
        assert_eq!(events[0].data["roomId"], "A");
        assert_eq!(events[1].event, "room-info");
        assert_eq!(events[1].data["hostId"], "host");
        assert_eq!(events[1].data["viewerCount"], 0);

        let state = harness.repository.begin().await;
        let room = state.rooms.get(&rid("A")).unwrap();
        assert_eq!(room.host_id(), &sid("host"));
        assert_eq!(room.created_at(), Timestamp::new(FIXED_TIME));
    }

    #[tokio::test]
    async fn test_create_duplicate_room_is_rejected() {
        // テスト項目: 既存の Room ID での作成は room-exists になり、既存の Room は変わらない
        // given (前提条件):
        let mut harness = Harness::new();
        let h1 = harness.connect("h1").await;
        let h2 = harness.connect("h2").await;
        let usecase = create_usecase(&harness);
        usecase.execute(&h1, rid("A")).await.unwrap();
        harness.clear();

        // when (操作):
        let result = usecase.execute(&h2, rid("A")).await;

        // then (期待する結果):
        assert_eq!(result, Err(ProtocolError::RoomExists("A".to_string())));
        assert_eq!(harness.event_names("h2"), vec!["room-exists"]);
        assert!(harness.event_names("h1").is_empty());
        let state = harness.repository.begin().await;
        assert_eq!(state.rooms.get(&rid("A")).unwrap().host_id(), &sid("h1"));
        assert!(state.room_of(&h2).is_none());
    }

    #[tokio::test]
    async fn test_viewer_creating_room_leaves_previous_room() {
        // テスト項目: 視聴者が Room を作成すると元の Room から退出し、元のホストに user-left が届く
        // given (前提条件):
        let mut harness = Harness::new();
        let host = harness.connect("host").await;
        let viewer = harness.connect("v1").await;
        let usecase = create_usecase(&harness);
        usecase.execute(&host, rid("A")).await.unwrap();
        {
            let mut state = harness.repository.begin().await;
            state.join_room(&viewer, rid("A")).unwrap();
        }
        harness.clear();

        // when (操作):
        usecase.execute(&viewer, rid("B")).await.unwrap();

        // then (期待する結果):
        assert_eq!(harness.event_names("host"), vec!["user-left", "room-info"]);
        assert_eq!(harness.event_names("v1"), vec!["room-created", "room-info"]);
        let state = harness.repository.begin().await;
        assert!(!state.rooms.get(&rid("A")).unwrap().is_viewer(&viewer));
        assert_eq!(state.room_of(&viewer).unwrap().id(), &rid("B"));
    }
}
