//! UseCase 層
//!
//! 受信イベントごとにセッション状態を1回だけロックし、
//! 状態遷移とそれに伴うすべての通知をロック中に行う。

mod connect_participant;
mod create_room;
mod disconnect_participant;
pub mod error;
mod get_rooms;
mod host_streaming;
mod join_room;
mod leave_room;
mod notify;
mod relay_signal;
mod send_message;
mod stream_request;
mod viewer_streaming;

#[cfg(test)]
pub(crate) mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::ProtocolError;
pub use get_rooms::GetRoomsUseCase;
pub use host_streaming::HostStreamingUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_signal::{RelayOutcome, RelaySignalUseCase};
pub use send_message::SendMessageUseCase;
pub use stream_request::StreamRequestUseCase;
pub use viewer_streaming::ViewerStreamingUseCase;
