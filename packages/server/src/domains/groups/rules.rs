//! Composite authorization rules for the groups domain.
//!
//! These predicates open their own read transactions against the same graph
//! the gated operation is about to mutate, so they are tagged `NoCache`.
//! Absence of a group, caller, or membership is a denial, never an error;
//! only transport/store failures surface as faults (and the guard maps those
//! to denials too).

use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::{json, Value};

use crate::common::auth::{CachePolicy, Rule, RuleContext};
use crate::domains::groups::models::{ACTING_AND_TARGET_ROLES, GROUP_WITH_VIEWER_ROLE};
use crate::kernel::graph::Record;

const ACCEPTED_ROLES: [&str; 3] = ["usual", "admin", "owner"];

fn membership_role<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record
        .object(field)
        .and_then(|member| member.get("myRoleInGroup"))
        .and_then(Value::as_str)
}

fn seeing_members_check(ctx: &RuleContext) -> BoxFuture<'_, Result<bool>> {
    Box::pin(async move {
        let Some(viewer) = ctx.viewer() else {
            return Ok(false);
        };
        let Some(group_id) = ctx.arg_str("id") else {
            return Ok(false);
        };

        let mut tx = ctx.graph().read_transaction().await?;
        let records = tx
            .run(
                GROUP_WITH_VIEWER_ROLE,
                json!({ "groupId": group_id, "userId": viewer.id.to_string() }),
            )
            .await?;

        // No record means the group does not exist: deny.
        let Some(record) = records.first() else {
            return Ok(false);
        };
        let Some(group) = record.object("group") else {
            return Ok(false);
        };

        let group_type = group.get("groupType").and_then(Value::as_str);
        let role = membership_role(record, "member");

        Ok(match group_type {
            Some("public") => true,
            Some("closed") | Some("hidden") => {
                role.is_some_and(|r| ACCEPTED_ROLES.contains(&r))
            }
            _ => false,
        })
    })
}

fn change_member_role_check(ctx: &RuleContext) -> BoxFuture<'_, Result<bool>> {
    Box::pin(async move {
        let Some(viewer) = ctx.viewer() else {
            return Ok(false);
        };
        let (Some(group_id), Some(user_id), Some(requested)) = (
            ctx.arg_str("groupId"),
            ctx.arg_str("userId"),
            ctx.arg_str("roleInGroup"),
        ) else {
            return Ok(false);
        };

        // No self-promotion or self-demotion through this path.
        let acting_id = viewer.id.to_string();
        if acting_id == user_id {
            return Ok(false);
        }

        let mut tx = ctx.graph().read_transaction().await?;
        let records = tx
            .run(
                ACTING_AND_TARGET_ROLES,
                json!({ "groupId": group_id, "adminId": acting_id, "userId": user_id }),
            )
            .await?;

        // The query requires the group and the acting membership; no record
        // means one of them is missing.
        let Some(record) = records.first() else {
            return Ok(false);
        };
        if record.object("group").is_none() || record.object("admin").is_none() {
            return Ok(false);
        }

        // Owners cannot be demoted through this path.
        if let Some(target_role) = membership_role(record, "member") {
            if target_role == "owner" && requested != "owner" {
                return Ok(false);
            }
        }

        Ok(match membership_role(record, "admin") {
            Some("admin") => matches!(requested, "pending" | "usual" | "admin"),
            Some("owner") => matches!(requested, "pending" | "usual" | "admin" | "owner"),
            _ => false,
        })
    })
}

fn join_group_check(ctx: &RuleContext) -> BoxFuture<'_, Result<bool>> {
    Box::pin(async move {
        let Some(_viewer) = ctx.viewer() else {
            return Ok(false);
        };
        let (Some(group_id), Some(user_id)) = (ctx.arg_str("groupId"), ctx.arg_str("userId"))
        else {
            return Ok(false);
        };

        let mut tx = ctx.graph().read_transaction().await?;
        let records = tx
            .run(
                GROUP_WITH_VIEWER_ROLE,
                json!({ "groupId": group_id, "userId": user_id }),
            )
            .await?;

        let Some(record) = records.first() else {
            return Ok(false);
        };
        let Some(group) = record.object("group") else {
            return Ok(false);
        };

        // Public and closed groups are openly joinable; hidden groups only
        // for users already holding a membership role (invited/pre-added).
        if group.get("groupType").and_then(Value::as_str) != Some("hidden") {
            return Ok(true);
        }
        Ok(membership_role(record, "member").is_some())
    })
}

pub static IS_ALLOWED_SEEING_MEMBERS_OF_GROUP: Rule = Rule {
    name: "is_allowed_seeing_members_of_group",
    cache: CachePolicy::NoCache,
    check: seeing_members_check,
};

pub static IS_ALLOWED_TO_CHANGE_GROUP_MEMBER_ROLE: Rule = Rule {
    name: "is_allowed_to_change_group_member_role",
    cache: CachePolicy::NoCache,
    check: change_member_role_check,
};

pub static IS_ALLOWED_TO_JOIN_GROUP: Rule = Rule {
    name: "is_allowed_to_join_group",
    cache: CachePolicy::NoCache,
    check: join_group_check,
};
