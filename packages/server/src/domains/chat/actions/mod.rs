mod create_message;
mod mark_seen;
mod queries;

pub use create_message::create_message;
pub use mark_seen::mark_messages_as_seen;
pub use queries::{list_messages, unread_rooms};
pub(crate) use queries::count_unread_rooms;
