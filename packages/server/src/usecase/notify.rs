//! Notification helpers shared by the use cases.
//!
//! Delivery is fire-and-forget: a failed push is logged and never aborts the
//! transition that produced it.

use crate::domain::{Departure, MessagePusher, Notification, Room, SessionId, Signal};

/// Push to one participant, logging failures.
pub(crate) async fn push(
    pusher: &dyn MessagePusher,
    target: &SessionId,
    notification: Notification,
) {
    if let Err(e) = pusher.push_to(target, &notification).await {
        tracing::warn!(
            "Failed to push '{}' to '{}': {}",
            notification.event_name(),
            target,
            e
        );
    }
}

/// Push to many participants, logging failures.
pub(crate) async fn broadcast(
    pusher: &dyn MessagePusher,
    targets: &[SessionId],
    notification: Notification,
) {
    if targets.is_empty() {
        return;
    }
    if let Err(e) = pusher.broadcast(targets, &notification).await {
        tracing::warn!("Failed to broadcast '{}': {}", notification.event_name(), e);
    }
}

/// Broadcast the current `room-info` snapshot to every member.
pub(crate) async fn broadcast_room_info(pusher: &dyn MessagePusher, room: &Room) {
    broadcast(pusher, &room.members(), Notification::RoomInfo(room.info())).await;
}

/// Deliver queued signals in order.
pub(crate) async fn deliver_signals(
    pusher: &dyn MessagePusher,
    target: &SessionId,
    signals: Vec<Signal>,
) {
    if !signals.is_empty() {
        tracing::info!("Delivering {} queued signal(s) to '{}'", signals.len(), target);
    }
    for signal in signals {
        push(pusher, target, Notification::Signal(signal)).await;
    }
}

/// Emit the effects of a participant leaving its room.
pub(crate) async fn announce_departure(pusher: &dyn MessagePusher, departure: Departure) {
    match departure {
        Departure::NotInRoom => {}
        Departure::RoomClosed { room } => {
            tracing::info!(
                "Room '{}' closed by host '{}' ({} viewer(s) removed)",
                room.id(),
                room.host_id(),
                room.viewers().len()
            );
            broadcast(
                pusher,
                room.viewers(),
                Notification::HostLeft {
                    host_id: room.host_id().clone(),
                },
            )
            .await;
            broadcast(
                pusher,
                room.viewers(),
                Notification::RoomClosed {
                    room_id: room.id().clone(),
                },
            )
            .await;
        }
        Departure::ViewerLeft {
            room_id,
            viewer_id,
            host_id,
            was_streamer,
            remaining_members,
            info,
        } => {
            tracing::info!("Viewer '{}' left room '{}'", viewer_id, room_id);
            if was_streamer {
                broadcast(
                    pusher,
                    &remaining_members,
                    Notification::ViewerStoppedStreaming {
                        viewer_id: viewer_id.clone(),
                    },
                )
                .await;
            }
            push(pusher, &host_id, Notification::UserLeft { viewer_id }).await;
            broadcast(pusher, &remaining_members, Notification::RoomInfo(info)).await;
        }
    }
}
