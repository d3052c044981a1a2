//! Typed ID definitions for all domain entities.

pub use super::id::Id;

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for User entities.
pub struct User;

/// Marker type for Group entities.
pub struct Group;

/// Marker type for chat Room entities.
pub struct Room;

/// Marker type for chat Message entities.
pub struct Message;

/// Marker type for Category entities.
pub struct Category;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for User entities.
pub type UserId = Id<User>;

/// Typed ID for Group entities.
pub type GroupId = Id<Group>;

/// Typed ID for chat Room entities.
pub type RoomId = Id<Room>;

/// Typed ID for chat Message entities.
pub type MessageId = Id<Message>;

/// Typed ID for Category entities.
pub type CategoryId = Id<Category>;
