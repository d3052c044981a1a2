use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{GroupRole, UserId};

/// A user as seen through a membership edge: node properties plus the role
/// the edge carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMember {
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub my_role_in_group: Option<GroupRole>,
}

impl GroupMember {
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).context("Unexpected shape for member record")
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Idempotent join: MERGE keys the edge on (member, group), so a repeated
/// join matches the existing edge and leaves its role untouched.
pub const JOIN_GROUP: &str = r#"
MATCH (member:User {id: $userId}), (group:Group {id: $groupId})
MERGE (member)-[membership:MEMBER_OF]->(group)
ON CREATE SET
  membership.createdAt = toString(datetime()),
  membership.role =
    CASE WHEN group.groupType = 'public'
      THEN 'usual'
      ELSE 'pending'
      END
RETURN member {.*, myRoleInGroup: membership.role}
"#;

/// Role upsert: creates the edge with the requested role (join-with-role)
/// or updates role and updatedAt on the existing edge.
pub const CHANGE_MEMBER_ROLE: &str = r#"
MATCH (member:User {id: $userId}), (group:Group {id: $groupId})
MERGE (member)-[membership:MEMBER_OF]->(group)
ON CREATE SET
  membership.createdAt = toString(datetime()),
  membership.role = $roleInGroup
ON MATCH SET
  membership.updatedAt = toString(datetime()),
  membership.role = $roleInGroup
RETURN member {.*, myRoleInGroup: membership.role}
"#;

/// All members of a group with their roles.
pub const GROUP_MEMBERS: &str = r#"
MATCH (user:User)-[membership:MEMBER_OF]->(:Group {id: $groupId})
RETURN user {.*, myRoleInGroup: membership.role}
"#;
