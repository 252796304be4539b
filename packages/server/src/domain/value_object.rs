//! 値オブジェクト
//!
//! 識別子やメッセージ本文など、ドメインで扱う文字列はすべてここで検証してから
//! 内部に持ち込みます。検証は「空でないこと」のみで、内容のサニタイズは行いません。

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

/// Display name used when a participant never identified itself.
pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

/// 空でない文字列をラップする値オブジェクトを定義する
macro_rules! non_empty_string {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// 検証付きで生成する
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ValueObjectError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

non_empty_string!(
    /// Transient identifier of one live connection.
    SessionId,
    "session id"
);

non_empty_string!(
    /// Caller-chosen stable identifier bound through `identify`.
    DurableId,
    "durable id"
);

non_empty_string!(
    /// Caller-chosen room identifier.
    RoomId,
    "room id"
);

non_empty_string!(
    /// Chat message body.
    MessageContent,
    "message"
);

non_empty_string!(
    /// Reaction type such as `"clap"`; opaque to the server.
    ReactionKind,
    "reaction type"
);

non_empty_string!(
    /// Signaling target or sender: a session id or a bound durable id.
    PeerAddress,
    "peer address"
);

/// SessionId の生成
pub struct SessionIdFactory;

impl SessionIdFactory {
    /// UUID v4 から新しい SessionId を生成する
    pub fn generate() -> SessionId {
        SessionId(uuid::Uuid::new_v4().to_string())
    }
}

impl From<SessionId> for PeerAddress {
    fn from(value: SessionId) -> Self {
        PeerAddress(value.0)
    }
}

impl From<DurableId> for PeerAddress {
    fn from(value: DurableId) -> Self {
        PeerAddress(value.0)
    }
}

/// Free-text label shown to other participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// 空白のみの名前は既定値 "Anonymous" に置き換える
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self::default()
        } else {
            Self(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self(DEFAULT_DISPLAY_NAME.to_string())
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
