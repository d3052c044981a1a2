//! Chat domain events - immutable facts published after a commit.
//!
//! Fan-out is scoped to the other room participant, never the sender;
//! subscribers additionally filter on `userId`.

use serde_json::{json, Value};

use crate::common::UserId;
use crate::domains::chat::models::Message;
use crate::kernel::EventBus;

pub const CHAT_MESSAGE_ADDED: &str = "chat:message_added";
pub const ROOM_COUNT_UPDATED: &str = "chat:room_count_updated";

/// Chat domain events - immutable facts
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A message was created; addressed to the recipient, not the sender.
    MessageAdded { message: Message, recipient_id: UserId },

    /// The recipient's unread-room count changed.
    RoomCountUpdated { user_id: UserId, unread_rooms: i64 },
}

impl ChatEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            ChatEvent::MessageAdded { .. } => CHAT_MESSAGE_ADDED,
            ChatEvent::RoomCountUpdated { .. } => ROOM_COUNT_UPDATED,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ChatEvent::MessageAdded {
                message,
                recipient_id,
            } => json!({ "chatMessageAdded": message, "userId": recipient_id }),
            ChatEvent::RoomCountUpdated {
                user_id,
                unread_rooms,
            } => json!({ "roomCountUpdated": unread_rooms, "userId": user_id }),
        }
    }

    /// Fire-and-forget publish; subscribers filter on their side.
    pub async fn publish(self, bus: &EventBus) {
        bus.publish(self.topic(), self.payload()).await;
    }
}
