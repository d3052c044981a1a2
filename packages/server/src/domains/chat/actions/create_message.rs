//! Create message action - atomic per-room index assignment plus
//! post-commit fan-out to the other participant.

use anyhow::anyhow;
use serde_json::{json, Value};
use tracing::info;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, MessageId, RoomId, UserId};
use crate::domains::chat::actions::count_unread_rooms;
use crate::domains::chat::events::ChatEvent;
use crate::domains::chat::models::{Message, CREATE_MESSAGE};
use crate::kernel::ServerDeps;

/// Create a message in a room the sender chats in.
///
/// The next `indexId` is computed and written inside the same write
/// transaction, so concurrent senders get distinct, contiguous indexes.
/// After the commit, the other participant is notified with the message and
/// their recomputed unread-room count; the sender gets no event.
pub async fn create_message(
    room_id: RoomId,
    content: String,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> Result<Message, AppError> {
    let ctx = RuleContext::new(
        Some(viewer.clone()),
        json!({ "roomId": room_id, "content": content }),
        deps.graph.clone(),
    );
    deps.guard.assert("Mutation", "CreateMessage", &ctx).await?;

    info!(%room_id, sender_id = %viewer.id, "Creating message");

    let message_id = MessageId::new();
    let mut tx = deps.graph.write_transaction().await?;
    let records = tx
        .run(
            CREATE_MESSAGE,
            json!({
                "roomId": room_id,
                "senderId": viewer.id,
                "content": content,
                "id": message_id,
            }),
        )
        .await?;
    tx.commit().await?;

    // No record: the sender has no CHATS_IN edge to this room.
    let Some(record) = records.first() else {
        return Err(AppError::AuthorizationDenied);
    };
    let message_value = record
        .get("message")
        .ok_or_else(|| AppError::from(anyhow!("Message creation returned no record")))?;
    let message = Message::from_value(message_value)?;

    let recipient_id = message_value
        .get("otherUser")
        .and_then(|other| other.get("id"))
        .and_then(Value::as_str)
        .and_then(|id| id.parse::<UserId>().ok());

    if let Some(recipient_id) = recipient_id {
        let unread_rooms = count_unread_rooms(recipient_id, deps).await?;
        ChatEvent::RoomCountUpdated {
            user_id: recipient_id,
            unread_rooms,
        }
        .publish(&deps.event_bus)
        .await;
        ChatEvent::MessageAdded {
            message: message.clone(),
            recipient_id,
        }
        .publish(&deps.event_bus)
        .await;
    }

    Ok(message)
}
