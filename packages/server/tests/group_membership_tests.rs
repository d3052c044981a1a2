//! Group membership integration tests: creation preconditions, the join
//! flow per group type, the role transition table, and visibility of the
//! member list.

mod common;

use crate::common::TestHarness;
use server_core::common::{AppError, GroupId, GroupRole, GroupType, UserRole};
use server_core::domains::groups::actions::{
    change_member_role, create_group, group_members, join_group, list_groups, CreateGroupParams,
};
use server_core::domains::groups::events;
use server_core::Config;

fn group_params(slug: &str, group_type: GroupType) -> CreateGroupParams {
    CreateGroupParams {
        id: None,
        name: format!("Group {slug}"),
        slug: slug.to_string(),
        description: "<p>We talk about gardens</p>".to_string(),
        about: None,
        group_type,
        category_ids: None,
    }
}

// ============================================================================
// Group creation
// ============================================================================

#[tokio::test]
async fn creator_becomes_owner() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;

    let group = harness.seed_group(&founder, "gardeners", GroupType::Closed).await;

    assert_eq!(group.my_role, Some(GroupRole::Owner));
    assert_eq!(
        harness.graph.membership_role(founder.id, group.id).await,
        Some("owner".to_string())
    );
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    harness.seed_group(&founder, "gardeners", GroupType::Public).await;

    let err = create_group(group_params("gardeners", GroupType::Public), &founder, &harness.deps)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Group with this slug already exists!");
    assert_eq!(harness.graph.group_count().await, 1);
}

#[tokio::test]
async fn description_is_measured_without_markup() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;

    let mut params = group_params("short", GroupType::Public);
    params.description = "<p><strong>ab</strong></p>".to_string();
    let err = create_group(params, &founder, &harness.deps).await.unwrap_err();

    assert_eq!(err.to_string(), "Description too short!");
    assert_eq!(harness.graph.group_count().await, 0);
}

#[tokio::test]
async fn category_bounds_apply_only_when_active() {
    let config = Config {
        categories_active: true,
        ..Config::default()
    };
    let harness = TestHarness::with_config(config);
    let founder = harness.seed_viewer("Ana", UserRole::User).await;

    let err = create_group(group_params("none", GroupType::Public), &founder, &harness.deps)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Too view categories!");

    let mut params = group_params("many", GroupType::Public);
    params.category_ids = Some(
        (0..4).map(|_| server_core::common::CategoryId::new()).collect(),
    );
    let err = create_group(params, &founder, &harness.deps).await.unwrap_err();
    assert_eq!(err.to_string(), "Too many categories!");

    // Inactive config skips the bounds entirely.
    let relaxed = TestHarness::new();
    let founder = relaxed.seed_viewer("Ana", UserRole::User).await;
    assert!(
        create_group(group_params("none", GroupType::Public), &founder, &relaxed.deps)
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn categorized_group_links_seeded_categories() {
    let config = Config {
        categories_active: true,
        ..Config::default()
    };
    let harness = TestHarness::with_config(config);
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let category = server_core::common::CategoryId::new();
    harness.graph.seed_category(category).await;

    let mut params = group_params("tagged", GroupType::Public);
    params.category_ids = Some(vec![category]);
    let group = create_group(params, &founder, &harness.deps).await.unwrap();

    assert_eq!(group.my_role, Some(GroupRole::Owner));
}

// ============================================================================
// Joining
// ============================================================================

#[tokio::test]
async fn joining_a_public_group_grants_usual() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "open-door", GroupType::Public).await;

    let member = join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Usual));
}

#[tokio::test]
async fn joining_a_closed_group_grants_pending() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;

    let member = join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Pending));
}

#[tokio::test]
async fn joining_twice_leaves_the_membership_untouched() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;

    join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();
    // Promote, then join again: the second join must not reset the role.
    change_member_role(group.id, joiner.id, GroupRole::Usual, Some(&founder), &harness.deps)
        .await
        .unwrap();
    let member = join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Usual));
    assert_eq!(harness.graph.membership_count(group.id).await, 2);
}

#[tokio::test]
async fn hidden_group_rejects_uninvited_joins() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let outsider = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "speakeasy", GroupType::Hidden).await;

    let err = join_group(group.id, outsider.id, Some(&outsider), &harness.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
    assert_eq!(harness.graph.membership_role(outsider.id, group.id).await, None);
}

#[tokio::test]
async fn invited_user_can_join_a_hidden_group() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let invitee = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "speakeasy", GroupType::Hidden).await;

    // Pre-adding through a role change is the invitation.
    change_member_role(group.id, invitee.id, GroupRole::Usual, Some(&founder), &harness.deps)
        .await
        .unwrap();
    let member = join_group(group.id, invitee.id, Some(&invitee), &harness.deps)
        .await
        .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Usual));
}

#[tokio::test]
async fn anonymous_join_is_denied() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "open-door", GroupType::Public).await;

    let err = join_group(group.id, joiner.id, None, &harness.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
}

#[tokio::test]
async fn joining_a_missing_group_is_denied() {
    let harness = TestHarness::new();
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;

    let err = join_group(GroupId::new(), joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
}

// ============================================================================
// Role changes
// ============================================================================

#[tokio::test]
async fn owner_promotes_pending_member_to_usual() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;
    join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();

    let member =
        change_member_role(group.id, joiner.id, GroupRole::Usual, Some(&founder), &harness.deps)
            .await
            .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Usual));
}

#[tokio::test]
async fn group_admin_cannot_mint_owners() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let admin = harness.seed_viewer("Ben", UserRole::User).await;
    let member = harness.seed_viewer("Cleo", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;
    change_member_role(group.id, admin.id, GroupRole::Admin, Some(&founder), &harness.deps)
        .await
        .unwrap();
    join_group(group.id, member.id, Some(&member), &harness.deps)
        .await
        .unwrap();

    let err =
        change_member_role(group.id, member.id, GroupRole::Owner, Some(&admin), &harness.deps)
            .await
            .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
    // Within its table the admin is fine.
    change_member_role(group.id, member.id, GroupRole::Admin, Some(&admin), &harness.deps)
        .await
        .unwrap();
}

#[tokio::test]
async fn owners_cannot_be_demoted() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let second_owner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;
    change_member_role(group.id, second_owner.id, GroupRole::Owner, Some(&founder), &harness.deps)
        .await
        .unwrap();

    let err = change_member_role(
        group.id,
        second_owner.id,
        GroupRole::Usual,
        Some(&founder),
        &harness.deps,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
    assert_eq!(
        harness.graph.membership_role(second_owner.id, group.id).await,
        Some("owner".to_string())
    );
}

#[tokio::test]
async fn group_admin_cannot_demote_the_owner() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let admin = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;
    change_member_role(group.id, admin.id, GroupRole::Admin, Some(&founder), &harness.deps)
        .await
        .unwrap();

    let err =
        change_member_role(group.id, founder.id, GroupRole::Usual, Some(&admin), &harness.deps)
            .await
            .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
    assert_eq!(
        harness.graph.membership_role(founder.id, group.id).await,
        Some("owner".to_string())
    );
}

#[tokio::test]
async fn self_role_changes_are_denied() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;

    let err =
        change_member_role(group.id, founder.id, GroupRole::Owner, Some(&founder), &harness.deps)
            .await
            .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
}

#[tokio::test]
async fn plain_members_cannot_change_roles() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let usual = harness.seed_viewer("Ben", UserRole::User).await;
    let target = harness.seed_viewer("Cleo", UserRole::User).await;
    let group = harness.seed_group(&founder, "open-door", GroupType::Public).await;
    join_group(group.id, usual.id, Some(&usual), &harness.deps)
        .await
        .unwrap();
    join_group(group.id, target.id, Some(&target), &harness.deps)
        .await
        .unwrap();

    let err =
        change_member_role(group.id, target.id, GroupRole::Admin, Some(&usual), &harness.deps)
            .await
            .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationDenied));
}

#[tokio::test]
async fn role_change_can_pre_add_a_nonmember() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let invitee = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "speakeasy", GroupType::Hidden).await;

    let member =
        change_member_role(group.id, invitee.id, GroupRole::Usual, Some(&founder), &harness.deps)
            .await
            .unwrap();

    assert_eq!(member.my_role_in_group, Some(GroupRole::Usual));
    assert_eq!(harness.graph.membership_count(group.id).await, 2);
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn member_list_of_a_public_group_is_open() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let outsider = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "open-door", GroupType::Public).await;

    let members = group_members(group.id, Some(&outsider), &harness.deps)
        .await
        .unwrap();

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].id, founder.id);
    assert_eq!(members[0].my_role_in_group, Some(GroupRole::Owner));
}

#[tokio::test]
async fn closed_member_list_requires_an_accepted_membership() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let pending = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "velvet-rope", GroupType::Closed).await;
    join_group(group.id, pending.id, Some(&pending), &harness.deps)
        .await
        .unwrap();

    // Pending is not accepted.
    let err = group_members(group.id, Some(&pending), &harness.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthorizationDenied));

    change_member_role(group.id, pending.id, GroupRole::Usual, Some(&founder), &harness.deps)
        .await
        .unwrap();
    let members = group_members(group.id, Some(&pending), &harness.deps)
        .await
        .unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn hidden_member_list_is_invisible_to_outsiders() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let outsider = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "speakeasy", GroupType::Hidden).await;

    let err = group_members(group.id, Some(&outsider), &harness.deps)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::AuthorizationDenied));

    let members = group_members(group.id, Some(&founder), &harness.deps)
        .await
        .unwrap();
    assert_eq!(members.len(), 1);
}

#[tokio::test]
async fn list_groups_filters_on_membership() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let viewer = harness.seed_viewer("Ben", UserRole::User).await;
    let mine = harness.seed_group(&founder, "mine", GroupType::Public).await;
    harness.seed_group(&founder, "theirs", GroupType::Public).await;
    join_group(mine.id, viewer.id, Some(&viewer), &harness.deps)
        .await
        .unwrap();

    let member_of = list_groups(Some(true), &viewer, &harness.deps).await.unwrap();
    assert_eq!(member_of.len(), 1);
    assert_eq!(member_of[0].slug, "mine");
    assert_eq!(member_of[0].my_role, Some(GroupRole::Usual));

    let not_member_of = list_groups(Some(false), &viewer, &harness.deps).await.unwrap();
    assert_eq!(not_member_of.len(), 1);
    assert_eq!(not_member_of[0].slug, "theirs");
    assert!(not_member_of[0].my_role.is_none());

    let all = list_groups(None, &viewer, &harness.deps).await.unwrap();
    assert_eq!(all.len(), 2);
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn membership_changes_are_published() {
    let harness = TestHarness::new();
    let founder = harness.seed_viewer("Ana", UserRole::User).await;
    let joiner = harness.seed_viewer("Ben", UserRole::User).await;
    let group = harness.seed_group(&founder, "open-door", GroupType::Public).await;

    let mut joined = harness
        .deps
        .event_bus
        .subscribe(events::GROUP_MEMBER_JOINED)
        .await;
    let mut changed = harness
        .deps
        .event_bus
        .subscribe(events::GROUP_MEMBER_ROLE_CHANGED)
        .await;

    join_group(group.id, joiner.id, Some(&joiner), &harness.deps)
        .await
        .unwrap();
    let event = joined.recv().await.unwrap();
    assert_eq!(event["groupId"], group.id.to_string());
    assert_eq!(event["member"]["id"], joiner.id.to_string());

    change_member_role(group.id, joiner.id, GroupRole::Admin, Some(&founder), &harness.deps)
        .await
        .unwrap();
    let event = changed.recv().await.unwrap();
    assert_eq!(event["member"]["myRoleInGroup"], "admin");
}
