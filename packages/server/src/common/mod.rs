pub mod auth;
pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod roles;
pub mod utils;

pub use entity_ids::{CategoryId, GroupId, MessageId, RoomId, UserId};
pub use errors::AppError;
pub use roles::{GroupRole, GroupType, UserRole};
