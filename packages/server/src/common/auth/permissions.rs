//! The application policy table and the generic identity rules.
//!
//! Domain-specific composite rules (membership visibility, role
//! transitions, join gating) live next to their domain in
//! `domains::groups::rules`; this module owns the rules that only look at
//! the caller identity, and assembles the table the guard serves.

use futures::future::BoxFuture;
use serde_json::Value;

use super::context::RuleContext;
use super::policy::{PolicyTree, DEFAULT_FALLBACK};
use super::rules::{or, CachePolicy, Rule, RuleExpr};
use crate::domains::groups::rules::{
    IS_ALLOWED_SEEING_MEMBERS_OF_GROUP, IS_ALLOWED_TO_CHANGE_GROUP_MEMBER_ROLE,
    IS_ALLOWED_TO_JOIN_GROUP,
};

fn is_authenticated_check(ctx: &RuleContext) -> BoxFuture<'_, anyhow::Result<bool>> {
    Box::pin(async move { Ok(ctx.viewer().is_some()) })
}

fn is_moderator_check(ctx: &RuleContext) -> BoxFuture<'_, anyhow::Result<bool>> {
    Box::pin(async move { Ok(ctx.viewer().is_some_and(|v| v.is_moderator())) })
}

fn is_admin_check(ctx: &RuleContext) -> BoxFuture<'_, anyhow::Result<bool>> {
    Box::pin(async move { Ok(ctx.viewer().is_some_and(|v| v.is_admin())) })
}

fn is_my_own_check(ctx: &RuleContext) -> BoxFuture<'_, anyhow::Result<bool>> {
    Box::pin(async move {
        let Some(viewer) = ctx.viewer() else {
            return Ok(false);
        };
        let parent_id = ctx
            .parent()
            .and_then(|parent| parent.get("id"))
            .and_then(Value::as_str);
        Ok(parent_id == Some(viewer.id.to_string().as_str()))
    })
}

/// The caller is logged in. Identity does not change mid-operation, so the
/// decision is memoized per context.
pub static IS_AUTHENTICATED: Rule = Rule {
    name: "is_authenticated",
    cache: CachePolicy::Contextual,
    check: is_authenticated_check,
};

pub static IS_MODERATOR: Rule = Rule {
    name: "is_moderator",
    cache: CachePolicy::None,
    check: is_moderator_check,
};

pub static IS_ADMIN: Rule = Rule {
    name: "is_admin",
    cache: CachePolicy::None,
    check: is_admin_check,
};

/// Field-level rule: the resolved parent entity belongs to the caller.
pub static IS_MY_OWN: Rule = Rule {
    name: "is_my_own",
    cache: CachePolicy::NoCache,
    check: is_my_own_check,
};

/// Build the policy table served by the guard.
///
/// Every type carries a `'*': deny` wildcard and the global fallback is
/// deny, so an operation added without an entry here stays closed.
pub fn policy_tree() -> PolicyTree {
    PolicyTree::new(DEFAULT_FALLBACK)
        // Queries
        .wildcard("Query", RuleExpr::Deny)
        .operation("Query", "Group", &IS_AUTHENTICATED)
        .operation("Query", "GroupMembers", &IS_ALLOWED_SEEING_MEMBERS_OF_GROUP)
        .operation("Query", "Message", &IS_AUTHENTICATED)
        .operation("Query", "UnreadRooms", &IS_AUTHENTICATED)
        // Mutations
        .wildcard("Mutation", RuleExpr::Deny)
        .operation("Mutation", "CreateGroup", &IS_AUTHENTICATED)
        .operation("Mutation", "JoinGroup", &IS_ALLOWED_TO_JOIN_GROUP)
        .operation(
            "Mutation",
            "ChangeGroupMemberRole",
            &IS_ALLOWED_TO_CHANGE_GROUP_MEMBER_ROLE,
        )
        .operation("Mutation", "CreateMessage", &IS_AUTHENTICATED)
        .operation("Mutation", "MarkMessagesAsSeen", &IS_AUTHENTICATED)
        // Field-level
        .operation("User", "email", or(vec![(&IS_MY_OWN).into(), (&IS_ADMIN).into()]))
}
