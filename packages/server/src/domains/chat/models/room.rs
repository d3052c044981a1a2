//! Room queries.
//!
//! A room is a container of messages with a fixed participant set
//! (`CHATS_IN` edges). Room creation is not an operation of this core;
//! rooms arrive through the store.

/// Count rooms holding messages the user has not seen and did not author.
pub const UNREAD_ROOMS: &str = r#"
MATCH (:User {id: $userId})-[:CHATS_IN]->(room:Room)
MATCH (sender:User)-[:CREATED]->(message:Message)-[:INSIDE]->(room)
WHERE NOT sender.id = $userId AND message.seen = false
RETURN COUNT(DISTINCT room) AS unreadCount
"#;
