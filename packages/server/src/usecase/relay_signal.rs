//! UseCase: WebRTC シグナル（offer / answer / ice-candidate）の中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelaySignalUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 宛先が未接続のシグナルはエラーにならずキューに積まれることを保証
//! - 同じ送信元から同じ宛先へのシグナルは、キュー経由と即時配送の境界をまたいでも順序が保たれることを保証
//! - 中継されたシグナルに送信元のアドレスが付くことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中の宛先（session id / durable id）への即時配送
//! - エッジケース：未接続の宛先へのキューイング、キューが残っている宛先への配送、
//!   切断済みの session id 宛てシグナルの破棄

use std::sync::Arc;

use crate::domain::{
    MessagePusher, Notification, PeerAddress, SessionId, SessionRepository, Signal, SignalKind,
};

use super::{error::ProtocolError, notify};

/// 中継の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// 宛先に即時配送した
    Delivered,
    /// 宛先が未接続のためキューに積んだ
    Queued,
    /// 宛先が切断済みの session id のため破棄した
    Dropped,
}

/// シグナル中継のユースケース
pub struct RelaySignalUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// シグナル中継を実行
    ///
    /// 宛先のアドレス（session id または durable id）が接続中なら、その宛先に残っている
    /// キューを先に配送してからこのシグナルを送る。未接続ならキューに積む。
    /// ただし宛先が切断済みの session id ならキューは二度と取り出されないので破棄する。
    /// payload の中身は検査しない。
    ///
    /// # Errors
    ///
    /// * `ProtocolError::NotConnected` - 送信元の接続情報が存在しない
    pub async fn execute(
        &self,
        session_id: &SessionId,
        kind: SignalKind,
        target: PeerAddress,
        payload: serde_json::Value,
    ) -> Result<RelayOutcome, ProtocolError> {
        let mut state = self.repository.begin().await;
        let pusher = self.message_pusher.as_ref();

        let sender = state
            .connections
            .get(session_id)
            .map(|c| c.address())
            .ok_or_else(|| ProtocolError::NotConnected(session_id.as_str().to_string()))?;
        let signal = Signal {
            kind,
            payload,
            sender,
        };

        match state.connections.resolve(target.as_str()) {
            Some(target_id) => {
                let pending = state.connections.drain_connection(&target_id);
                notify::deliver_signals(pusher, &target_id, pending).await;
                tracing::debug!(
                    "Relaying '{}' from '{}' to '{}'",
                    kind.event_name(),
                    signal.sender,
                    target
                );
                notify::push(pusher, &target_id, Notification::Signal(signal)).await;
                Ok(RelayOutcome::Delivered)
            }
            None if state.connections.is_released(target.as_str()) => {
                tracing::debug!(
                    "Target '{}' has disconnected, dropping '{}' from '{}'",
                    target,
                    kind.event_name(),
                    signal.sender
                );
                Ok(RelayOutcome::Dropped)
            }
            None => {
                tracing::debug!(
                    "Target '{}' is not connected, queueing '{}' from '{}'",
                    target,
                    kind.event_name(),
                    signal.sender
                );
                state.connections.enqueue(target.as_str(), signal);
                Ok(RelayOutcome::Queued)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, DurableId};
    use crate::usecase::test_support::{Harness, sid};

    fn create_usecase(harness: &Harness) -> RelaySignalUseCase {
        RelaySignalUseCase::new(harness.repository.clone(), harness.pusher.clone())
    }

    fn addr(value: &str) -> PeerAddress {
        PeerAddress::new(value.to_string()).unwrap()
    }

    async fn identify(harness: &Harness, session: &str, durable: &str) {
        let mut state = harness.repository.begin().await;
        state
            .identify(
                &sid(session),
                DurableId::new(durable.to_string()).unwrap(),
                DisplayName::default(),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_relay_to_connected_target_by_durable_id() {
        // テスト項目: 接続中の宛先には即時配送され、送信元の durable id が sender として付く
        // given (前提条件):
        let mut harness = Harness::new();
        harness.connect("s1").await;
        harness.connect("s2").await;
        identify(&harness, "s1", "alice").await;
        identify(&harness, "s2", "bob").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let outcome = usecase
            .execute(
                &sid("s1"),
                SignalKind::Offer,
                addr("bob"),
                serde_json::json!({"type": "offer", "sdp": "v=0"}),
            )
            .await;

        // then (期待する結果):
        assert_eq!(outcome, Ok(RelayOutcome::Delivered));
        let events = harness.events("s2");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "offer");
        assert_eq!(
            events[0].data,
            serde_json::json!({"sdp": {"type": "offer", "sdp": "v=0"}, "sender": "alice"})
        );
    }

    #[tokio::test]
    async fn test_relay_ice_candidate_by_session_id() {
        // テスト項目: session id 宛ての ice-candidate は candidate フィールドで届き、sender は session id
        // given (前提条件):
        let mut harness = Harness::new();
        harness.connect("s1").await;
        harness.connect("s2").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        usecase
            .execute(
                &sid("s1"),
                SignalKind::IceCandidate,
                addr("s2"),
                serde_json::json!({"candidate": "c"}),
            )
            .await
            .unwrap();

        // then (期待する結果):
        let events = harness.events("s2");
        assert_eq!(events[0].event, "ice-candidate");
        assert_eq!(events[0].data["candidate"], serde_json::json!({"candidate": "c"}));
        assert_eq!(events[0].data["sender"], "s1");
    }

    #[tokio::test]
    async fn test_relay_to_unknown_target_is_queued() {
        // テスト項目: 未接続の宛先へのシグナルはエラーにならずキューに積まれる
        // given (前提条件):
        let mut harness = Harness::new();
        harness.connect("s1").await;
        let usecase = create_usecase(&harness);

        // when (操作):
        let outcome = usecase
            .execute(&sid("s1"), SignalKind::Offer, addr("v1"), serde_json::json!("x"))
            .await;

        // then (期待する結果):
        assert_eq!(outcome, Ok(RelayOutcome::Queued));
        assert!(harness.event_names("s1").is_empty());
        let state = harness.repository.begin().await;
        assert_eq!(state.connections.pending_count("v1"), 1);
    }

    #[tokio::test]
    async fn test_relay_to_disconnected_session_is_dropped() {
        // テスト項目: 切断済みの session id 宛てのシグナルはキューに積まれず破棄される
        // given (前提条件):
        let mut harness = Harness::new();
        harness.connect("v1").await;
        harness.connect("v2").await;
        {
            let mut state = harness.repository.begin().await;
            state.disconnect(&sid("v1"));
        }
        let usecase = create_usecase(&harness);

        // when (操作):
        let mut outcomes = Vec::new();
        for candidate in ["c1", "c2", "c3"] {
            outcomes.push(
                usecase
                    .execute(
                        &sid("v2"),
                        SignalKind::IceCandidate,
                        addr("v1"),
                        serde_json::json!(candidate),
                    )
                    .await,
            );
        }

        // then (期待する結果):
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(|o| *o == Ok(RelayOutcome::Dropped)));
        assert!(harness.event_names("v2").is_empty());
        let state = harness.repository.begin().await;
        assert_eq!(state.connections.pending_count("v1"), 0);
    }

    #[tokio::test]
    async fn test_order_preserved_across_queue_boundary() {
        // テスト項目: キューに残っているシグナルは後続の即時配送より先に届く
        // given (前提条件):
        let mut harness = Harness::new();
        harness.connect("s1").await;
        let usecase = create_usecase(&harness);
        usecase
            .execute(&sid("s1"), SignalKind::Offer, addr("s2"), serde_json::json!("first"))
            .await
            .unwrap();
        // 宛先の接続が登録されたが、まだキューは取り出されていない
        harness.connect("s2").await;

        // when (操作):
        usecase
            .execute(&sid("s1"), SignalKind::IceCandidate, addr("s2"), serde_json::json!("second"))
            .await
            .unwrap();

        // then (期待する結果):
        let events = harness.events("s2");
        let names: Vec<&str> = events.iter().map(|e| e.event.as_str()).collect();
        assert_eq!(names, vec!["offer", "ice-candidate"]);
        assert_eq!(events[0].data["sdp"], "first");
        assert_eq!(events[1].data["candidate"], "second");
    }

    #[tokio::test]
    async fn test_relay_from_unknown_sender() {
        // テスト項目: 接続情報のない送信元からのシグナルは NotConnected になる
        // given (前提条件):
        let harness = Harness::new();
        let usecase = create_usecase(&harness);

        // when (操作):
        let outcome = usecase
            .execute(&sid("ghost"), SignalKind::Answer, addr("s2"), serde_json::json!("x"))
            .await;

        // then (期待する結果):
        assert_eq!(outcome, Err(ProtocolError::NotConnected("ghost".to_string())));
    }
}
