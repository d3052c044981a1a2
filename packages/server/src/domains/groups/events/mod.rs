//! Group domain events - immutable facts published after a commit.

use serde_json::{json, Value};

use crate::common::GroupId;
use crate::domains::groups::models::{Group, GroupMember};
use crate::kernel::EventBus;

pub const GROUP_CREATED: &str = "groups:created";
pub const GROUP_MEMBER_JOINED: &str = "groups:member_joined";
pub const GROUP_MEMBER_ROLE_CHANGED: &str = "groups:member_role_changed";

/// Group domain events - immutable facts
#[derive(Debug, Clone)]
pub enum GroupEvent {
    /// Group was created with its owner membership
    GroupCreated { group: Group },

    /// A user joined (or re-joined) a group
    MemberJoined { group_id: GroupId, member: GroupMember },

    /// A member's role was changed
    MemberRoleChanged { group_id: GroupId, member: GroupMember },
}

impl GroupEvent {
    pub fn topic(&self) -> &'static str {
        match self {
            GroupEvent::GroupCreated { .. } => GROUP_CREATED,
            GroupEvent::MemberJoined { .. } => GROUP_MEMBER_JOINED,
            GroupEvent::MemberRoleChanged { .. } => GROUP_MEMBER_ROLE_CHANGED,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            GroupEvent::GroupCreated { group } => json!({ "group": group }),
            GroupEvent::MemberJoined { group_id, member } => {
                json!({ "groupId": group_id, "member": member })
            }
            GroupEvent::MemberRoleChanged { group_id, member } => {
                json!({ "groupId": group_id, "member": member })
            }
        }
    }

    /// Fire-and-forget publish; subscribers filter on their side.
    pub async fn publish(self, bus: &EventBus) {
        bus.publish(self.topic(), self.payload()).await;
    }
}
