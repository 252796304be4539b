//! Entities: rooms, live connections, chat entries and queued signals.

use super::{
    error::RoomError,
    value_object::{
        DisplayName, DurableId, MessageContent, PeerAddress, RoomId, SessionId, Timestamp,
    },
};

/// One entry of a room's chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: SessionId,
    pub content: MessageContent,
    pub timestamp: Timestamp,
}

impl ChatMessage {
    pub fn new(sender: SessionId, content: MessageContent, timestamp: Timestamp) -> Self {
        Self {
            sender,
            content,
            timestamp,
        }
    }
}

/// Presence summary broadcast as `room-info` after every membership or
/// streaming change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub host_id: SessionId,
    pub viewer_count: usize,
    pub is_host_active: bool,
    pub is_host_streaming: bool,
    pub streaming_viewer_ids: Vec<SessionId>,
    pub approved_viewer_ids: Vec<SessionId>,
}

/// What a viewer receives on `room-joined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub host_id: SessionId,
    pub is_streaming: bool,
    pub viewer_count: usize,
    pub messages: Vec<ChatMessage>,
    pub approved_viewer_ids: Vec<SessionId>,
}

/// Result of removing a viewer from a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewerRemoval {
    /// The session was a viewer before the call.
    pub removed: bool,
    /// The viewer was approved to publish (and maybe publishing).
    pub was_streamer: bool,
}

/// A room with one fixed host and up to `capacity` viewers.
///
/// The role sets are kept nested: `streaming_viewers ⊆ approved_streamers ⊆ viewers`,
/// and the host is never a viewer. Every mutator below preserves this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    id: RoomId,
    host_id: SessionId,
    viewers: Vec<SessionId>,
    approved_streamers: Vec<SessionId>,
    streaming_viewers: Vec<SessionId>,
    is_streaming: bool,
    messages: Vec<ChatMessage>,
    created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, host_id: SessionId, created_at: Timestamp) -> Self {
        Self {
            id,
            host_id,
            viewers: Vec::new(),
            approved_streamers: Vec::new(),
            streaming_viewers: Vec::new(),
            is_streaming: false,
            messages: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn host_id(&self) -> &SessionId {
        &self.host_id
    }

    pub fn viewers(&self) -> &[SessionId] {
        &self.viewers
    }

    pub fn approved_streamers(&self) -> &[SessionId] {
        &self.approved_streamers
    }

    pub fn streaming_viewers(&self) -> &[SessionId] {
        &self.streaming_viewers
    }

    pub fn is_streaming(&self) -> bool {
        self.is_streaming
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn is_host(&self, session_id: &SessionId) -> bool {
        &self.host_id == session_id
    }

    pub fn is_viewer(&self, session_id: &SessionId) -> bool {
        self.viewers.contains(session_id)
    }

    pub fn is_member(&self, session_id: &SessionId) -> bool {
        self.is_host(session_id) || self.is_viewer(session_id)
    }

    pub fn is_approved(&self, session_id: &SessionId) -> bool {
        self.approved_streamers.contains(session_id)
    }

    /// Host first, then viewers in join order.
    pub fn members(&self) -> Vec<SessionId> {
        std::iter::once(self.host_id.clone())
            .chain(self.viewers.iter().cloned())
            .collect()
    }

    /// Adds a viewer. Joining twice is a no-op.
    ///
    /// # Errors
    ///
    /// * `RoomError::IsHost` - the host tried to join its own room
    /// * `RoomError::Full` - `capacity` viewers are already present
    pub fn add_viewer(&mut self, session_id: SessionId, capacity: usize) -> Result<(), RoomError> {
        if self.is_host(&session_id) {
            return Err(RoomError::IsHost(session_id.into_string()));
        }
        if self.is_viewer(&session_id) {
            return Ok(());
        }
        if self.viewers.len() >= capacity {
            return Err(RoomError::Full(self.id.as_str().to_string()));
        }
        self.viewers.push(session_id);
        Ok(())
    }

    /// Removes a viewer together with its streamer roles. Idempotent.
    pub fn remove_viewer(&mut self, session_id: &SessionId) -> ViewerRemoval {
        let was_streamer = self.is_approved(session_id);
        let before = self.viewers.len();
        self.viewers.retain(|id| id != session_id);
        self.approved_streamers.retain(|id| id != session_id);
        self.streaming_viewers.retain(|id| id != session_id);
        ViewerRemoval {
            removed: self.viewers.len() != before,
            was_streamer,
        }
    }

    pub fn approve_streamer(&mut self, session_id: &SessionId) -> Result<(), RoomError> {
        if !self.is_viewer(session_id) {
            return Err(RoomError::NotAViewer(session_id.as_str().to_string()));
        }
        if !self.is_approved(session_id) {
            self.approved_streamers.push(session_id.clone());
        }
        Ok(())
    }

    pub fn start_viewer_stream(&mut self, session_id: &SessionId) -> Result<(), RoomError> {
        if !self.is_approved(session_id) {
            return Err(RoomError::NotApproved(session_id.as_str().to_string()));
        }
        if !self.streaming_viewers.contains(session_id) {
            self.streaming_viewers.push(session_id.clone());
        }
        Ok(())
    }

    /// Drops both the approval and the streaming flag of a viewer.
    pub fn revoke_streamer(&mut self, session_id: &SessionId) -> Result<(), RoomError> {
        if !self.is_viewer(session_id) {
            return Err(RoomError::NotAViewer(session_id.as_str().to_string()));
        }
        self.approved_streamers.retain(|id| id != session_id);
        self.streaming_viewers.retain(|id| id != session_id);
        Ok(())
    }

    pub fn set_host_streaming(&mut self, streaming: bool) {
        self.is_streaming = streaming;
    }

    pub fn add_message(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn info(&self) -> RoomInfo {
        RoomInfo {
            host_id: self.host_id.clone(),
            viewer_count: self.viewers.len(),
            // the room only exists while its host is connected
            is_host_active: true,
            is_host_streaming: self.is_streaming,
            streaming_viewer_ids: self.streaming_viewers.clone(),
            approved_viewer_ids: self.approved_streamers.clone(),
        }
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            host_id: self.host_id.clone(),
            is_streaming: self.is_streaming,
            viewer_count: self.viewers.len(),
            messages: self.messages.clone(),
            approved_viewer_ids: self.approved_streamers.clone(),
        }
    }

    /// Checks the nesting of the role sets.
    pub fn roles_consistent(&self) -> bool {
        !self.viewers.contains(&self.host_id)
            && self
                .approved_streamers
                .iter()
                .all(|id| self.viewers.contains(id))
            && self
                .streaming_viewers
                .iter()
                .all(|id| self.approved_streamers.contains(id))
    }
}

/// A live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub session_id: SessionId,
    pub durable_id: Option<DurableId>,
    pub display_name: DisplayName,
    /// Room this connection hosts or views.
    pub room_id: Option<RoomId>,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(session_id: SessionId, connected_at: Timestamp) -> Self {
        Self {
            session_id,
            durable_id: None,
            display_name: DisplayName::default(),
            room_id: None,
            connected_at,
        }
    }

    /// Address other peers use to reach this connection.
    pub fn address(&self) -> PeerAddress {
        match &self.durable_id {
            Some(durable_id) => durable_id.clone().into(),
            None => self.session_id.clone().into(),
        }
    }
}

/// Signaling message kinds relayed between peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
}

impl SignalKind {
    /// Event name on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
        }
    }

    /// Payload field name on the wire.
    pub fn payload_field(&self) -> &'static str {
        match self {
            SignalKind::Offer | SignalKind::Answer => "sdp",
            SignalKind::IceCandidate => "candidate",
        }
    }
}

/// A relayed signal; the payload is never inspected.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub payload: serde_json::Value,
    pub sender: PeerAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sid(value: &str) -> SessionId {
        SessionId::new(value.to_string()).unwrap()
    }

    fn create_test_room() -> Room {
        Room::new(
            RoomId::new("A".to_string()).unwrap(),
            sid("host"),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_add_viewer_rejects_when_full() {
        // テスト項目: 容量いっぱいの Room への参加は Full エラーになり、メンバーは変わらない
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 2).unwrap();
        room.add_viewer(sid("v2"), 2).unwrap();

        // when (操作):
        let result = room.add_viewer(sid("v3"), 2);

        // then (期待する結果):
        assert_eq!(result, Err(RoomError::Full("A".to_string())));
        assert_eq!(room.viewers(), &[sid("v1"), sid("v2")]);
    }

    #[test]
    fn test_add_viewer_rejects_host() {
        // テスト項目: ホストは自分の Room に視聴者として参加できない
        // given (前提条件):
        let mut room = create_test_room();

        // when (操作):
        let result = room.add_viewer(sid("host"), 10);

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::IsHost(_))));
        assert!(room.viewers().is_empty());
        assert!(room.roles_consistent());
    }

    #[test]
    fn test_add_viewer_twice_is_noop() {
        // テスト項目: 同じ視聴者の二重参加は何も変えない
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 10).unwrap();

        // when (操作):
        let result = room.add_viewer(sid("v1"), 10);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(room.viewers().len(), 1);
    }

    #[test]
    fn test_streaming_requires_approval() {
        // テスト項目: 承認されていない視聴者は配信を開始できない
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 10).unwrap();

        // when (操作):
        let before_approval = room.start_viewer_stream(&sid("v1"));
        room.approve_streamer(&sid("v1")).unwrap();
        let after_approval = room.start_viewer_stream(&sid("v1"));

        // then (期待する結果):
        assert!(matches!(before_approval, Err(RoomError::NotApproved(_))));
        assert!(after_approval.is_ok());
        assert_eq!(room.streaming_viewers(), &[sid("v1")]);
        assert!(room.roles_consistent());
    }

    #[test]
    fn test_approve_requires_viewer() {
        // テスト項目: 視聴者でないセッションは承認できない
        // given (前提条件):
        let mut room = create_test_room();

        // when (操作):
        let result = room.approve_streamer(&sid("stranger"));

        // then (期待する結果):
        assert!(matches!(result, Err(RoomError::NotAViewer(_))));
        assert!(room.approved_streamers().is_empty());
    }

    #[test]
    fn test_revoke_clears_both_roles() {
        // テスト項目: 配信停止で承認と配信中の両方が外れる
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 10).unwrap();
        room.approve_streamer(&sid("v1")).unwrap();
        room.start_viewer_stream(&sid("v1")).unwrap();

        // when (操作):
        room.revoke_streamer(&sid("v1")).unwrap();

        // then (期待する結果):
        assert!(room.approved_streamers().is_empty());
        assert!(room.streaming_viewers().is_empty());
        assert!(room.is_viewer(&sid("v1")));
    }

    #[test]
    fn test_remove_viewer_reports_streamer_and_is_idempotent() {
        // テスト項目: 視聴者の削除は配信者だったかを返し、二度目は何もしない
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 10).unwrap();
        room.approve_streamer(&sid("v1")).unwrap();
        room.start_viewer_stream(&sid("v1")).unwrap();

        // when (操作):
        let first = room.remove_viewer(&sid("v1"));
        let second = room.remove_viewer(&sid("v1"));

        // then (期待する結果):
        assert_eq!(
            first,
            ViewerRemoval {
                removed: true,
                was_streamer: true
            }
        );
        assert_eq!(second, ViewerRemoval::default());
        assert!(room.roles_consistent());
        assert!(room.viewers().is_empty());
    }

    #[test]
    fn test_info_reflects_roles() {
        // テスト項目: room-info スナップショットに配信状態と承認済みリストが反映される
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v1"), 10).unwrap();
        room.add_viewer(sid("v2"), 10).unwrap();
        room.approve_streamer(&sid("v2")).unwrap();
        room.set_host_streaming(true);

        // when (操作):
        let info = room.info();

        // then (期待する結果):
        assert_eq!(info.host_id, sid("host"));
        assert_eq!(info.viewer_count, 2);
        assert!(info.is_host_active);
        assert!(info.is_host_streaming);
        assert_eq!(info.approved_viewer_ids, vec![sid("v2")]);
        assert!(info.streaming_viewer_ids.is_empty());
    }

    #[test]
    fn test_members_lists_host_first() {
        // テスト項目: メンバー一覧はホストが先頭で、その後に参加順の視聴者が続く
        // given (前提条件):
        let mut room = create_test_room();
        room.add_viewer(sid("v2"), 10).unwrap();
        room.add_viewer(sid("v1"), 10).unwrap();

        // when (操作):
        let members = room.members();

        // then (期待する結果):
        assert_eq!(members, vec![sid("host"), sid("v2"), sid("v1")]);
    }

    #[test]
    fn test_connection_address_prefers_durable_id() {
        // テスト項目: durable id があればそれがアドレスになる
        // given (前提条件):
        let mut connection = Connection::new(sid("s1"), Timestamp::new(0));
        let before = connection.address();

        // when (操作):
        connection.durable_id = Some(DurableId::new("alice".to_string()).unwrap());

        // then (期待する結果):
        assert_eq!(before.as_str(), "s1");
        assert_eq!(connection.address().as_str(), "alice");
    }
}
