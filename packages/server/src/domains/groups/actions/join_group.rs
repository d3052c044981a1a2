//! Join group action - idempotent membership upsert.

use anyhow::anyhow;
use serde_json::json;
use tracing::info;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::{AppError, GroupId, UserId};
use crate::domains::groups::events::GroupEvent;
use crate::domains::groups::models::{GroupMember, JOIN_GROUP};
use crate::kernel::ServerDeps;

/// Join a group, or return the existing membership unchanged.
///
/// The existence check and the edge creation are one MERGE inside one write
/// transaction, so concurrent joins cannot duplicate the edge. The role the
/// edge gets on first creation (`usual` for public groups, `pending`
/// otherwise) is this service's decision, not the rule's.
pub async fn join_group(
    group_id: GroupId,
    user_id: UserId,
    viewer: Option<&Viewer>,
    deps: &ServerDeps,
) -> Result<GroupMember, AppError> {
    let ctx = RuleContext::new(
        viewer.cloned(),
        json!({ "groupId": group_id, "userId": user_id }),
        deps.graph.clone(),
    );
    deps.guard.assert("Mutation", "JoinGroup", &ctx).await?;

    info!(%group_id, %user_id, "Joining group");

    let mut tx = deps.graph.write_transaction().await?;
    let records = tx
        .run(JOIN_GROUP, json!({ "groupId": group_id, "userId": user_id }))
        .await?;
    tx.commit().await?;

    let member_value = records
        .first()
        .and_then(|record| record.get("member"))
        .ok_or_else(|| AppError::from(anyhow!("Join returned no membership record")))?;
    let member = GroupMember::from_value(member_value)?;

    GroupEvent::MemberJoined {
        group_id,
        member: member.clone(),
    }
    .publish(&deps.event_bus)
    .await;

    Ok(member)
}
