//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! プロセスのメモリ上にのみ状態を持ち、再起動すると失われます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Room, SessionGuard, SessionRepository, SessionState};

/// インメモリ Session Repository 実装
///
/// Room Registry と Connection Registry を1つの Mutex で保護します。
pub struct InMemorySessionRepository {
    state: Arc<Mutex<SessionState>>,
}

impl InMemorySessionRepository {
    /// 新しい InMemorySessionRepository を作成
    pub fn new(state: Arc<Mutex<SessionState>>) -> Self {
        Self { state }
    }

    /// 指定した Room 容量で空の状態から作成
    pub fn with_max_viewers(max_viewers: usize) -> Self {
        Self::new(Arc::new(Mutex::new(SessionState::new(max_viewers))))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn begin<'a>(&'a self) -> SessionGuard<'a> {
        self.state.lock().await
    }

    async fn count_rooms(&self) -> usize {
        self.state.lock().await.rooms.len()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let state = self.state.lock().await;
        state.rooms.list().into_iter().cloned().collect()
    }
}
