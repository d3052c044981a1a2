//! Create group action - group node, CREATED edge and owner membership in
//! one write transaction.

use anyhow::anyhow;
use serde_json::json;
use tracing::info;

use crate::common::auth::{RuleContext, Viewer};
use crate::common::utils::remove_html_tags;
use crate::common::{AppError, CategoryId, GroupId, GroupType};
use crate::domains::groups::events::GroupEvent;
use crate::domains::groups::models::{
    Group, CATEGORIES_MAX, CATEGORIES_MIN, CREATE_GROUP, CREATE_GROUP_WITH_CATEGORIES,
    DESCRIPTION_WITHOUT_HTML_LENGTH_MIN,
};
use crate::kernel::graph::ConstraintViolation;
use crate::kernel::ServerDeps;

pub struct CreateGroupParams {
    /// Caller-supplied id; generated when absent.
    pub id: Option<GroupId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub about: Option<String>,
    pub group_type: GroupType,
    pub category_ids: Option<Vec<CategoryId>>,
}

/// Create a group. The creator becomes its `owner`.
///
/// Precondition checks (category bounds, sanitized description length) run
/// before any transaction opens and report `InvalidInput`, a different kind
/// from an authorization denial.
pub async fn create_group(
    params: CreateGroupParams,
    viewer: &Viewer,
    deps: &ServerDeps,
) -> Result<Group, AppError> {
    let ctx = RuleContext::new(
        Some(viewer.clone()),
        json!({ "name": params.name, "slug": params.slug }),
        deps.graph.clone(),
    );
    deps.guard.assert("Mutation", "CreateGroup", &ctx).await?;

    if deps.config.categories_active {
        let count = params.category_ids.as_ref().map_or(0, Vec::len);
        if count < CATEGORIES_MIN {
            return Err(AppError::invalid_input("Too view categories!"));
        }
        if count > CATEGORIES_MAX {
            return Err(AppError::invalid_input("Too many categories!"));
        }
    }
    if remove_html_tags(&params.description).chars().count() < DESCRIPTION_WITHOUT_HTML_LENGTH_MIN
    {
        return Err(AppError::invalid_input("Description too short!"));
    }

    let group_id = params.id.unwrap_or_else(GroupId::new);
    info!(group_id = %group_id, slug = %params.slug, "Creating group");

    let node_params = json!({
        "id": group_id,
        "name": params.name,
        "slug": params.slug,
        "description": params.description,
        "about": params.about,
        "groupType": params.group_type,
        "disabled": false,
        "deleted": false,
    });
    let with_categories = deps.config.categories_active && params.category_ids.is_some();
    let (query, run_params) = if with_categories {
        (
            CREATE_GROUP_WITH_CATEGORIES,
            json!({
                "userId": viewer.id,
                "params": node_params,
                "categoryIds": params.category_ids,
            }),
        )
    } else {
        (CREATE_GROUP, json!({ "userId": viewer.id, "params": node_params }))
    };

    let mut tx = deps.graph.write_transaction().await?;
    let records = match tx.run(query, run_params).await {
        Ok(records) => records,
        Err(err) if err.is::<ConstraintViolation>() => {
            return Err(AppError::invalid_input("Group with this slug already exists!"));
        }
        Err(err) => return Err(err.into()),
    };
    tx.commit().await?;

    let record = records
        .first()
        .ok_or_else(|| AppError::from(anyhow!("Group creation returned no record")))?;
    let group = Group::from_record(record)?;

    GroupEvent::GroupCreated {
        group: group.clone(),
    }
    .publish(&deps.event_bus)
    .await;

    Ok(group)
}
