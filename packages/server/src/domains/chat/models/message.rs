use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{MessageId, RoomId, UserId};
use crate::kernel::graph::Record;

/// A chat message as projected from the graph.
///
/// `index_id` is the per-room sequence number: unique and strictly
/// increasing within a room regardless of concurrent senders. `distributed`
/// and `seen` only ever transition false to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub room_id: RoomId,
    pub sender_id: UserId,
    pub content: String,
    pub index_id: i64,
    pub distributed: bool,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).context("Unexpected shape for message record")
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        let value = record
            .get("message")
            .context("Record is missing the message field")?;
        Self::from_value(value)
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Create a message with the next per-room index.
///
/// The max-index read and the CREATE are one statement in one write
/// transaction; the store's write serialization is what keeps two
/// concurrent senders from computing the same index. The first MATCH also
/// verifies the sender actually chats in the room.
pub const CREATE_MESSAGE: &str = r#"
MATCH (sender:User {id: $senderId})-[:CHATS_IN]->(room:Room {id: $roomId})
OPTIONAL MATCH (m:Message)-[:INSIDE]->(room)
OPTIONAL MATCH (room)<-[:CHATS_IN]-(other:User) WHERE NOT other.id = $senderId
WITH MAX(m.indexId) AS maxIndex, room, sender, other
CREATE (sender)-[:CREATED]->(message:Message {
  id: $id,
  createdAt: toString(datetime()),
  indexId: CASE WHEN maxIndex IS NOT NULL THEN maxIndex + 1 ELSE 0 END,
  content: $content,
  distributed: false,
  seen: false
})-[:INSIDE]->(room)
RETURN message {.*, roomId: room.id, senderId: sender.id, otherUser: properties(other)}
"#;

/// Messages of a room, restricted to rooms the caller chats in, in the
/// store's natural (index) order.
pub const LIST_MESSAGES: &str = r#"
MATCH (:User {id: $userId})-[:CHATS_IN]->(room:Room {id: $roomId})
MATCH (sender:User)-[:CREATED]->(message:Message)-[:INSIDE]->(room)
RETURN message {.*, roomId: room.id, senderId: sender.id}
ORDER BY message.indexId
"#;

/// Flip the delivered flag. One-way: nothing ever sets it back to false.
pub const SET_DISTRIBUTED: &str = r#"
MATCH (m:Message) WHERE m.id IN $messageIds
SET m.distributed = true
RETURN m {.*}
"#;

/// Flip the seen flag on messages the caller did not author.
pub const MARK_SEEN: &str = r#"
MATCH (m:Message)<-[:CREATED]-(sender:User)
WHERE m.id IN $messageIds AND NOT sender.id = $userId
SET m.seen = true
RETURN m {.*}
"#;
