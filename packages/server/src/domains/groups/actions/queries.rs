//! Read actions for the groups domain.

use serde_json::json;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, GroupId};
use crate::domains::groups::models::{
    Group, GroupMember, GROUPS_ALL, GROUPS_WHERE_MEMBER, GROUPS_WHERE_NOT_MEMBER, GROUP_MEMBERS,
};
use crate::kernel::ServerDeps;

/// List groups, with the caller's role projected.
///
/// `is_member` filters to groups the caller belongs to (`Some(true)`), does
/// not belong to (`Some(false)`), or all groups (`None`).
pub async fn list_groups(
    is_member: Option<bool>,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> Result<Vec<Group>, AppError> {
    let ctx = RuleContext::new(
        Some(viewer.clone()),
        json!({ "isMember": is_member }),
        deps.graph.clone(),
    );
    deps.guard.assert("Query", "Group", &ctx).await?;

    let query = match is_member {
        Some(true) => GROUPS_WHERE_MEMBER,
        Some(false) => GROUPS_WHERE_NOT_MEMBER,
        None => GROUPS_ALL,
    };

    let mut tx = deps.graph.read_transaction().await?;
    let records = tx.run(query, json!({ "userId": viewer.id })).await?;

    let groups = records
        .iter()
        .map(Group::from_record)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(groups)
}

/// List the members of a group with their membership roles.
///
/// Gated by `is_allowed_seeing_members_of_group`: public groups are open,
/// closed/hidden groups require an accepted membership.
pub async fn group_members(
    group_id: GroupId,
    viewer: Option<&Viewer>,
    deps: &ServerDeps,
) -> Result<Vec<GroupMember>, AppError> {
    let ctx = RuleContext::new(
        viewer.cloned(),
        json!({ "id": group_id }),
        deps.graph.clone(),
    );
    deps.guard.assert("Query", "GroupMembers", &ctx).await?;

    let mut tx = deps.graph.read_transaction().await?;
    let records = tx
        .run(GROUP_MEMBERS, json!({ "groupId": group_id }))
        .await?;

    let members = records
        .iter()
        .filter_map(|record| record.get("user"))
        .map(GroupMember::from_value)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(members)
}
