//! Shared application state.

use std::sync::Arc;

use greenroom_shared::time::Clock;

use crate::domain::{MessagePusher, SessionRepository};
use crate::usecase::{
    ConnectParticipantUseCase, CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomsUseCase,
    HostStreamingUseCase, JoinRoomUseCase, LeaveRoomUseCase, RelaySignalUseCase,
    SendMessageUseCase, StreamRequestUseCase, ViewerStreamingUseCase,
};

/// Use cases reachable from the handlers.
pub struct AppState {
    /// ConnectParticipantUseCase（参加者接続と identify のユースケース）
    pub connect_participant_usecase: Arc<ConnectParticipantUseCase>,
    /// DisconnectParticipantUseCase（参加者切断のユースケース）
    pub disconnect_participant_usecase: Arc<DisconnectParticipantUseCase>,
    /// CreateRoomUseCase（Room 作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// JoinRoomUseCase（Room 参加のユースケース）
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    /// LeaveRoomUseCase（Room 退出のユースケース）
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    /// HostStreamingUseCase（ホスト配信のユースケース）
    pub host_streaming_usecase: Arc<HostStreamingUseCase>,
    /// StreamRequestUseCase（配信リクエストのユースケース）
    pub stream_request_usecase: Arc<StreamRequestUseCase>,
    /// ViewerStreamingUseCase（視聴者配信のユースケース）
    pub viewer_streaming_usecase: Arc<ViewerStreamingUseCase>,
    /// RelaySignalUseCase（シグナル中継のユースケース）
    pub relay_signal_usecase: Arc<RelaySignalUseCase>,
    /// SendMessageUseCase（チャット・リアクションのユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetRoomsUseCase（Room 一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
}

impl AppState {
    /// Wires every use case onto one repository, pusher and clock.
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connect_participant_usecase: Arc::new(ConnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            disconnect_participant_usecase: Arc::new(DisconnectParticipantUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            host_streaming_usecase: Arc::new(HostStreamingUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            stream_request_usecase: Arc::new(StreamRequestUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            viewer_streaming_usecase: Arc::new(ViewerStreamingUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            relay_signal_usecase: Arc::new(RelaySignalUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                repository.clone(),
                message_pusher,
                clock,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository)),
        }
    }
}
