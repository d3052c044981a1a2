//! Change member role action.
//!
//! The transition table lives entirely in the gating rule
//! (`is_allowed_to_change_group_member_role`); this action performs no
//! re-validation - policy and mechanism stay separate.

use anyhow::anyhow;
use serde_json::json;
use tracing::info;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, GroupId, GroupRole, UserId};
use crate::domains::groups::events::GroupEvent;
use crate::domains::groups::models::{GroupMember, CHANGE_MEMBER_ROLE};
use crate::kernel::ServerDeps;

/// Upsert the target member's role: creates the edge when absent
/// (join-with-role) or updates `role` and `updatedAt` when present.
pub async fn change_member_role(
    group_id: GroupId,
    user_id: UserId,
    new_role: GroupRole,
    viewer: Option<&Viewer>,
    deps: &ServerDeps,
) -> Result<GroupMember, AppError> {
    let ctx = RuleContext::new(
        viewer.cloned(),
        json!({ "groupId": group_id, "userId": user_id, "roleInGroup": new_role }),
        deps.graph.clone(),
    );
    deps.guard
        .assert("Mutation", "ChangeGroupMemberRole", &ctx)
        .await?;

    info!(%group_id, %user_id, role = %new_role, "Changing group member role");

    let mut tx = deps.graph.write_transaction().await?;
    let records = tx
        .run(
            CHANGE_MEMBER_ROLE,
            json!({ "groupId": group_id, "userId": user_id, "roleInGroup": new_role }),
        )
        .await?;
    tx.commit().await?;

    let member_value = records
        .first()
        .and_then(|record| record.get("member"))
        .ok_or_else(|| AppError::from(anyhow!("Role change returned no membership record")))?;
    let member = GroupMember::from_value(member_value)?;

    GroupEvent::MemberRoleChanged {
        group_id,
        member: member.clone(),
    }
    .publish(&deps.event_bus)
    .await;

    Ok(member)
}
