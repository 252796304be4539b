//! UseCase: Room 一覧・件数の取得（HTTP エンドポイント用）

use std::sync::Arc;

use crate::domain::{Room, SessionRepository};

/// Room 情報取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn SessionRepository>,
}

impl GetRoomsUseCase {
    /// 新しい GetRoomsUseCase を作成
    pub fn new(repository: Arc<dyn SessionRepository>) -> Self {
        Self { repository }
    }

    /// アクティブな Room の数
    pub async fn count(&self) -> usize {
        self.repository.count_rooms().await
    }

    /// アクティブな Room の一覧（Room ID 順）
    pub async fn list(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }
}
