//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::MutexGuard;

use super::{Room, SessionState};

/// 排他的にロックされたセッション状態
pub type SessionGuard<'a> = MutexGuard<'a, SessionState>;

/// Session Repository trait
///
/// Room Registry と Connection Registry をまとめて保持するストアへのインターフェース。
///
/// ## 排他制御
///
/// - 1つの受信イベントは `begin()` で得たガードを1回だけ保持して処理する
/// - ガードを保持している間に通知の送信まで終える
/// - これによりマルチスレッドのランタイム上でもイベントは1件ずつ直列に処理される
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// セッション状態を排他的にロックする
    async fn begin<'a>(&'a self) -> SessionGuard<'a>;

    /// アクティブな Room の数を取得
    async fn count_rooms(&self) -> usize;

    /// アクティブな Room の一覧を取得（Room ID 順）
    async fn list_rooms(&self) -> Vec<Room>;
}
