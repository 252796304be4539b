//! ドメイン層のエラー定義

use thiserror::Error;

/// 値オブジェクトの検証エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Room Registry と Room エンティティのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("room '{0}' already exists")]
    AlreadyExists(String),

    #[error("room '{0}' not found")]
    NotFound(String),

    #[error("room '{0}' is full")]
    Full(String),

    #[error("'{0}' is the host of this room")]
    IsHost(String),

    #[error("'{0}' is not a viewer of this room")]
    NotAViewer(String),

    #[error("'{0}' is not an approved streamer")]
    NotApproved(String),
}

/// Connection Registry のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// 別の接続がすでにその durable id を使用している
    #[error("durable id '{0}' is already bound to another connection")]
    AlreadyBound(String),

    /// この接続はすでに別の durable id で identify 済み
    #[error("connection is already identified as '{0}'")]
    AlreadyIdentified(String),

    #[error("session '{0}' is not connected")]
    UnknownSession(String),
}

/// MessagePusher のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),

    #[error("failed to serialize notification: {0}")]
    Serialization(String),
}
