//! Read actions for the chat domain.

use serde_json::json;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, RoomId, UserId};
use crate::domains::chat::models::{Message, LIST_MESSAGES, SET_DISTRIBUTED, UNREAD_ROOMS};
use crate::kernel::ServerDeps;

/// List a room's messages, newest first.
///
/// Messages addressed to the caller that were not yet delivered are flipped
/// to `distributed = true` in a follow-up write transaction; the returned
/// values already reflect the flip (read-your-own-write for the response).
pub async fn list_messages(
    room_id: RoomId,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> Result<Vec<Message>, AppError> {
    let ctx = RuleContext::new(
        Some(viewer.clone()),
        json!({ "roomId": room_id }),
        deps.graph.clone(),
    );
    deps.guard.assert("Query", "Message", &ctx).await?;

    let mut tx = deps.graph.read_transaction().await?;
    let records = tx
        .run(
            LIST_MESSAGES,
            json!({ "roomId": room_id, "userId": viewer.id }),
        )
        .await?;

    let mut messages = records
        .iter()
        .map(Message::from_record)
        .collect::<anyhow::Result<Vec<_>>>()?;

    let undistributed_ids: Vec<String> = messages
        .iter()
        .filter(|m| !m.distributed && m.sender_id != viewer.id)
        .map(|m| m.id.to_string())
        .collect();

    if !undistributed_ids.is_empty() {
        let mut write = deps.graph.write_transaction().await?;
        write
            .run(SET_DISTRIBUTED, json!({ "messageIds": undistributed_ids }))
            .await?;
        write.commit().await?;

        for message in &mut messages {
            if message.sender_id != viewer.id {
                message.distributed = true;
            }
        }
    }

    // Reverse of the store's natural (index) order: newest first.
    messages.reverse();
    Ok(messages)
}

/// The caller's unread-room count.
pub async fn unread_rooms(viewer: &Viewer, deps: &ServerDeps) -> Result<i64, AppError> {
    let ctx = RuleContext::new(Some(viewer.clone()), json!({}), deps.graph.clone());
    deps.guard.assert("Query", "UnreadRooms", &ctx).await?;

    Ok(count_unread_rooms(viewer.id, deps).await?)
}

/// Unguarded count used both by [`unread_rooms`] and by the post-commit
/// fan-out in `create_message` (which computes it for the recipient).
pub(crate) async fn count_unread_rooms(
    user_id: UserId,
    deps: &ServerDeps,
) -> anyhow::Result<i64> {
    let mut tx = deps.graph.read_transaction().await?;
    let records = tx.run(UNREAD_ROOMS, json!({ "userId": user_id })).await?;
    Ok(records
        .first()
        .and_then(|record| record.i64_field("unreadCount"))
        .unwrap_or(0))
}
