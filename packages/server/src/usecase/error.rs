//! UseCase 層のエラー定義

use thiserror::Error;

/// セッションプロトコルの拒否理由
///
/// 各バリアントは送信元の接続に返す拒否イベントに対応する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// `invalid-room`
    #[error("invalid room: {0}")]
    InvalidRoom(String),

    /// `room-exists`
    #[error("room '{0}' already exists")]
    RoomExists(String),

    /// `room-full`
    #[error("room '{0}' is full")]
    RoomFull(String),

    /// `socket-id-in-use`
    #[error("durable id '{0}' is already in use")]
    SocketIdInUse(String),

    /// `invalid-identify`
    #[error("invalid identify: {0}")]
    InvalidIdentify(String),

    /// `unauthorized`
    #[error("'{0}' is not allowed for this participant")]
    Unauthorized(&'static str),

    /// 送信元が Room に参加していない（黙って破棄）
    #[error("participant is not in room")]
    NotInRoom,

    /// 指定された視聴者が見つからない（黙って破棄）
    #[error("viewer '{0}' is not in this room")]
    UnknownViewer(String),

    /// 送信元の接続情報が存在しない
    #[error("session '{0}' is not connected")]
    NotConnected(String),
}
