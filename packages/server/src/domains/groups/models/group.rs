use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{GroupId, GroupRole, GroupType};
use crate::kernel::graph::Record;

/// Minimum categories a group must pick when category validation is active.
pub const CATEGORIES_MIN: usize = 1;
/// Maximum categories a group may pick.
pub const CATEGORIES_MAX: usize = 3;
/// Minimum length of the description once HTML markup is stripped.
pub const DESCRIPTION_WITHOUT_HTML_LENGTH_MIN: usize = 3;

/// A group node as projected from the graph.
///
/// Groups are never hard-deleted by this core; `deleted` and `disabled` are
/// flags. `my_role` is the caller's membership role when the query projected
/// one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub slug: String,
    pub group_type: GroupType,
    pub description: String,
    #[serde(default)]
    pub about: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub my_role: Option<GroupRole>,
}

impl Group {
    /// Parse a `group {.*}` map projection.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).context("Unexpected shape for group record")
    }

    pub fn from_record(record: &Record) -> Result<Self> {
        let value = record
            .get("group")
            .context("Record is missing the group field")?;
        Self::from_value(value)
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Group plus the caller's membership role, if any. The whole member pattern
/// is optional: a user without a membership edge projects as null.
pub const GROUP_WITH_VIEWER_ROLE: &str = r#"
MATCH (group:Group {id: $groupId})
OPTIONAL MATCH (member:User {id: $userId})-[membership:MEMBER_OF]->(group)
RETURN group {.*}, member {.*, myRoleInGroup: membership.role}
"#;

/// Acting member's role and target member's role for a role change. The
/// acting membership is required, the target membership optional.
pub const ACTING_AND_TARGET_ROLES: &str = r#"
MATCH (admin:User {id: $adminId})-[adminMembership:MEMBER_OF]->(group:Group {id: $groupId})
OPTIONAL MATCH (group)<-[userMembership:MEMBER_OF]-(member:User {id: $userId})
RETURN group {.*}, admin {.*, myRoleInGroup: adminMembership.role}, member {.*, myRoleInGroup: userMembership.role}
"#;

/// Create a group with its CREATED edge and owner membership in one write.
pub const CREATE_GROUP: &str = r#"
CREATE (group:Group)
SET group += $params
SET group.createdAt = toString(datetime())
SET group.updatedAt = toString(datetime())
WITH group
MATCH (owner:User {id: $userId})
MERGE (owner)-[:CREATED]->(group)
MERGE (owner)-[membership:MEMBER_OF]->(group)
SET membership.createdAt = toString(datetime())
SET membership.role = 'owner'
RETURN group {.*, myRole: membership.role}
"#;

/// As [`CREATE_GROUP`], additionally wiring CATEGORIZED edges.
pub const CREATE_GROUP_WITH_CATEGORIES: &str = r#"
CREATE (group:Group)
SET group += $params
SET group.createdAt = toString(datetime())
SET group.updatedAt = toString(datetime())
WITH group
MATCH (owner:User {id: $userId})
MERGE (owner)-[:CREATED]->(group)
MERGE (owner)-[membership:MEMBER_OF]->(group)
SET membership.createdAt = toString(datetime())
SET membership.role = 'owner'
WITH group, membership
UNWIND $categoryIds AS categoryId
MATCH (category:Category {id: categoryId})
MERGE (group)-[:CATEGORIZED]->(category)
RETURN group {.*, myRole: membership.role}
"#;

/// Groups the caller belongs to.
pub const GROUPS_WHERE_MEMBER: &str = r#"
MATCH (:User {id: $userId})-[membership:MEMBER_OF]->(group:Group)
RETURN group {.*, myRole: membership.role}
"#;

/// Groups the caller does not belong to.
pub const GROUPS_WHERE_NOT_MEMBER: &str = r#"
MATCH (group:Group)
WHERE NOT (:User {id: $userId})-[:MEMBER_OF]->(group)
RETURN group {.*, myRole: NULL}
"#;

/// All groups, with the caller's role projected where one exists.
pub const GROUPS_ALL: &str = r#"
MATCH (group:Group)
OPTIONAL MATCH (:User {id: $userId})-[membership:MEMBER_OF]->(group)
RETURN group {.*, myRole: membership.role}
"#;
