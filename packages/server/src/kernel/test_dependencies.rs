//! In-memory graph store for tests.
//!
//! `InMemoryGraph` implements the `GraphStore`/`GraphTransaction` pair
//! against plain hash maps and dispatches on the crate's own query
//! constants, with the same transactional contract as the real store:
//! reads see a snapshot, writes are staged and serialized, nothing is
//! visible before `commit`. Unknown query text is an error, so a test can
//! never silently run against an unmodeled query.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::common::{CategoryId, RoomId, UserId};
use crate::domains::chat::models::{
    CREATE_MESSAGE, LIST_MESSAGES, MARK_SEEN, SET_DISTRIBUTED, UNREAD_ROOMS,
};
use crate::domains::groups::models::{
    ACTING_AND_TARGET_ROLES, CHANGE_MEMBER_ROLE, CREATE_GROUP, CREATE_GROUP_WITH_CATEGORIES,
    GROUPS_ALL, GROUPS_WHERE_MEMBER, GROUPS_WHERE_NOT_MEMBER, GROUP_MEMBERS,
    GROUP_WITH_VIEWER_ROLE, JOIN_GROUP,
};
use crate::kernel::graph::{ConstraintViolation, GraphStore, GraphTransaction, Record};

type Props = Map<String, Value>;

#[derive(Debug, Clone, Default)]
struct GraphState {
    users: HashMap<String, Props>,
    groups: HashMap<String, Props>,
    /// Membership edge properties keyed by (userId, groupId).
    memberships: HashMap<(String, String), Props>,
    categories: HashSet<String>,
    group_categories: HashSet<(String, String)>,
    /// Room id to participant user ids (CHATS_IN edges).
    rooms: HashMap<String, Vec<String>>,
    messages: HashMap<String, Props>,
}

/// Hash-map backed graph store with real transactional semantics.
#[derive(Clone, Default)]
pub struct InMemoryGraph {
    state: Arc<Mutex<GraphState>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, id: UserId, name: &str) {
        let mut state = self.state.lock().await;
        let mut props = Props::new();
        props.insert("id".into(), json!(id));
        props.insert("name".into(), json!(name));
        state.users.insert(id.to_string(), props);
    }

    pub async fn seed_category(&self, id: CategoryId) {
        self.state.lock().await.categories.insert(id.to_string());
    }

    /// Seed a room and its participants' CHATS_IN edges. Participants must
    /// already be seeded users.
    pub async fn seed_room(&self, id: RoomId, participants: &[UserId]) {
        let mut state = self.state.lock().await;
        state.rooms.insert(
            id.to_string(),
            participants.iter().map(UserId::to_string).collect(),
        );
    }

    // ------------------------------------------------------------------
    // Inspection helpers for assertions
    // ------------------------------------------------------------------

    pub async fn membership_role(&self, user_id: UserId, group_id: impl ToString) -> Option<String> {
        let state = self.state.lock().await;
        state
            .memberships
            .get(&(user_id.to_string(), group_id.to_string()))
            .and_then(|edge| edge.get("role"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    pub async fn membership_count(&self, group_id: impl ToString) -> usize {
        let group_id = group_id.to_string();
        let state = self.state.lock().await;
        state
            .memberships
            .keys()
            .filter(|(_, g)| *g == group_id)
            .count()
    }

    pub async fn group_count(&self) -> usize {
        self.state.lock().await.groups.len()
    }

    pub async fn message_props(&self, message_id: impl ToString) -> Option<Value> {
        let state = self.state.lock().await;
        state
            .messages
            .get(&message_id.to_string())
            .map(|props| Value::Object(props.clone()))
    }
}

#[async_trait]
impl GraphStore for InMemoryGraph {
    async fn read_transaction(&self) -> Result<Box<dyn GraphTransaction>> {
        let snapshot = self.state.lock().await.clone();
        Ok(Box::new(InMemoryTransaction {
            staged: snapshot,
            guard: None,
            is_write: false,
        }))
    }

    async fn write_transaction(&self) -> Result<Box<dyn GraphTransaction>> {
        // Holding the owned guard until commit is what serializes writers.
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            staged,
            guard: Some(guard),
            is_write: true,
        }))
    }
}

struct InMemoryTransaction {
    staged: GraphState,
    guard: Option<OwnedMutexGuard<GraphState>>,
    is_write: bool,
}

#[async_trait]
impl GraphTransaction for InMemoryTransaction {
    async fn run(&mut self, query: &str, params: Value) -> Result<Vec<Record>> {
        if self.is_write && self.guard.is_none() {
            bail!("transaction already committed");
        }
        dispatch(&mut self.staged, query, &params)
    }

    async fn commit(&mut self) -> Result<()> {
        // Read transactions have nothing to publish; dropping the guard here
        // releases the writer lock so post-commit reads cannot deadlock.
        if let Some(mut guard) = self.guard.take() {
            *guard = std::mem::take(&mut self.staged);
        }
        Ok(())
    }
}

// ======================================================================
// Query dispatch
// ======================================================================

fn dispatch(state: &mut GraphState, query: &str, params: &Value) -> Result<Vec<Record>> {
    match query {
        q if q == GROUP_WITH_VIEWER_ROLE => group_with_viewer_role(state, params),
        q if q == ACTING_AND_TARGET_ROLES => acting_and_target_roles(state, params),
        q if q == CREATE_GROUP => create_group(state, params, false),
        q if q == CREATE_GROUP_WITH_CATEGORIES => create_group(state, params, true),
        q if q == GROUPS_WHERE_MEMBER => list_groups(state, params, Some(true)),
        q if q == GROUPS_WHERE_NOT_MEMBER => list_groups(state, params, Some(false)),
        q if q == GROUPS_ALL => list_groups(state, params, None),
        q if q == JOIN_GROUP => join_group(state, params),
        q if q == CHANGE_MEMBER_ROLE => change_member_role(state, params),
        q if q == GROUP_MEMBERS => group_members(state, params),
        q if q == CREATE_MESSAGE => create_message(state, params),
        q if q == LIST_MESSAGES => list_messages(state, params),
        q if q == SET_DISTRIBUTED => set_distributed(state, params),
        q if q == MARK_SEEN => mark_seen(state, params),
        q if q == UNREAD_ROOMS => unread_rooms(state, params),
        other => Err(anyhow!(
            "unsupported query in test graph: {}",
            other.lines().find(|l| !l.trim().is_empty()).unwrap_or("")
        )),
    }
}

fn param_str<'a>(params: &'a Value, key: &str) -> Result<&'a str> {
    params
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("missing parameter {key}"))
}

fn now() -> Value {
    json!(Utc::now().to_rfc3339())
}

fn with_field(props: &Props, field: &str, value: Value) -> Value {
    let mut out = props.clone();
    out.insert(field.into(), value);
    Value::Object(out)
}

fn edge_role(state: &GraphState, user_id: &str, group_id: &str) -> Option<Value> {
    state
        .memberships
        .get(&(user_id.to_string(), group_id.to_string()))
        .and_then(|edge| edge.get("role"))
        .cloned()
}

/// `user {.*, myRoleInGroup: membership.role}` when the edge exists, else null.
fn member_projection(state: &GraphState, user_id: &str, group_id: &str) -> Value {
    match (state.users.get(user_id), edge_role(state, user_id, group_id)) {
        (Some(user), Some(role)) => with_field(user, "myRoleInGroup", role),
        _ => Value::Null,
    }
}

// ----------------------------------------------------------------------
// Groups
// ----------------------------------------------------------------------

fn group_with_viewer_role(state: &GraphState, params: &Value) -> Result<Vec<Record>> {
    let group_id = param_str(params, "groupId")?;
    let user_id = param_str(params, "userId")?;
    let Some(group) = state.groups.get(group_id) else {
        return Ok(vec![]);
    };
    Ok(vec![Record::from(json!({
        "group": Value::Object(group.clone()),
        "member": member_projection(state, user_id, group_id),
    }))])
}

fn acting_and_target_roles(state: &GraphState, params: &Value) -> Result<Vec<Record>> {
    let group_id = param_str(params, "groupId")?;
    let admin_id = param_str(params, "adminId")?;
    let user_id = param_str(params, "userId")?;

    // Group and the acting membership are required matches.
    let Some(group) = state.groups.get(group_id) else {
        return Ok(vec![]);
    };
    let admin = member_projection(state, admin_id, group_id);
    if admin.is_null() {
        return Ok(vec![]);
    }
    Ok(vec![Record::from(json!({
        "group": Value::Object(group.clone()),
        "admin": admin,
        "member": member_projection(state, user_id, group_id),
    }))])
}

fn create_group(state: &mut GraphState, params: &Value, with_categories: bool) -> Result<Vec<Record>> {
    let user_id = param_str(params, "userId")?;
    let node_params = params
        .get("params")
        .and_then(Value::as_object)
        .ok_or_else(|| anyhow!("missing parameter params"))?;
    let group_id = node_params
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("group params carry no id"))?
        .to_owned();
    let slug = node_params.get("slug").and_then(Value::as_str).unwrap_or("");

    // The schema's uniqueness constraint on Group.slug.
    if state
        .groups
        .values()
        .any(|g| g.get("slug").and_then(Value::as_str) == Some(slug))
    {
        return Err(anyhow::Error::new(ConstraintViolation(format!(
            "Group.slug {slug}"
        ))));
    }

    let mut group = node_params.clone();
    group.insert("createdAt".into(), now());
    group.insert("updatedAt".into(), now());
    state.groups.insert(group_id.clone(), group.clone());

    // MATCH (owner:User ...) after the CREATE: no owner, no record.
    if !state.users.contains_key(user_id) {
        return Ok(vec![]);
    }
    let mut edge = Props::new();
    edge.insert("createdAt".into(), now());
    edge.insert("role".into(), json!("owner"));
    state
        .memberships
        .insert((user_id.to_owned(), group_id.clone()), edge);

    if with_categories {
        let category_ids: Vec<String> = params
            .get("categoryIds")
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        for category_id in category_ids {
            if !state.categories.contains(&category_id) {
                // UNWIND + MATCH on a missing category yields no rows.
                return Ok(vec![]);
            }
            state.group_categories.insert((group_id.clone(), category_id));
        }
    }

    Ok(vec![Record::from(json!({
        "group": with_field(&group, "myRole", json!("owner")),
    }))])
}

fn list_groups(state: &GraphState, params: &Value, is_member: Option<bool>) -> Result<Vec<Record>> {
    let user_id = param_str(params, "userId")?;
    let mut group_ids: Vec<&String> = state.groups.keys().collect();
    group_ids.sort();

    let mut records = Vec::new();
    for group_id in group_ids {
        let role = edge_role(state, user_id, group_id);
        match is_member {
            Some(true) if role.is_none() => continue,
            Some(false) if role.is_some() => continue,
            _ => {}
        }
        let group = &state.groups[group_id];
        records.push(Record::from(json!({
            "group": with_field(group, "myRole", role.unwrap_or(Value::Null)),
        })));
    }
    Ok(records)
}

fn join_group(state: &mut GraphState, params: &Value) -> Result<Vec<Record>> {
    let group_id = param_str(params, "groupId")?;
    let user_id = param_str(params, "userId")?;
    let (Some(group), Some(_)) = (state.groups.get(group_id), state.users.get(user_id)) else {
        return Ok(vec![]);
    };

    let key = (user_id.to_owned(), group_id.to_owned());
    if !state.memberships.contains_key(&key) {
        let role = if group.get("groupType").and_then(Value::as_str) == Some("public") {
            "usual"
        } else {
            "pending"
        };
        let mut edge = Props::new();
        edge.insert("createdAt".into(), now());
        edge.insert("role".into(), json!(role));
        state.memberships.insert(key, edge);
    }

    Ok(vec![Record::from(json!({
        "member": member_projection(state, user_id, group_id),
    }))])
}

fn change_member_role(state: &mut GraphState, params: &Value) -> Result<Vec<Record>> {
    let group_id = param_str(params, "groupId")?;
    let user_id = param_str(params, "userId")?;
    let role = param_str(params, "roleInGroup")?;
    if !state.groups.contains_key(group_id) || !state.users.contains_key(user_id) {
        return Ok(vec![]);
    }

    let key = (user_id.to_owned(), group_id.to_owned());
    let edge = state.memberships.entry(key).or_insert_with(|| {
        let mut edge = Props::new();
        edge.insert("createdAt".into(), now());
        edge
    });
    edge.insert("updatedAt".into(), now());
    edge.insert("role".into(), json!(role));

    Ok(vec![Record::from(json!({
        "member": member_projection(state, user_id, group_id),
    }))])
}

fn group_members(state: &GraphState, params: &Value) -> Result<Vec<Record>> {
    let group_id = param_str(params, "groupId")?;
    let mut user_ids: Vec<&String> = state
        .memberships
        .keys()
        .filter(|(_, g)| g == group_id)
        .map(|(u, _)| u)
        .collect();
    user_ids.sort();

    Ok(user_ids
        .into_iter()
        .map(|user_id| {
            Record::from(json!({
                "user": member_projection(state, user_id, group_id),
            }))
        })
        .collect())
}

// ----------------------------------------------------------------------
// Chat
// ----------------------------------------------------------------------

fn room_messages<'a>(state: &'a GraphState, room_id: &str) -> Vec<&'a Props> {
    let mut messages: Vec<&Props> = state
        .messages
        .values()
        .filter(|m| m.get("roomId").and_then(Value::as_str) == Some(room_id))
        .collect();
    messages.sort_by_key(|m| m.get("indexId").and_then(Value::as_i64).unwrap_or(0));
    messages
}

fn create_message(state: &mut GraphState, params: &Value) -> Result<Vec<Record>> {
    let room_id = param_str(params, "roomId")?;
    let sender_id = param_str(params, "senderId")?;
    let content = param_str(params, "content")?;
    let message_id = param_str(params, "id")?;

    let Some(participants) = state.rooms.get(room_id) else {
        return Ok(vec![]);
    };
    if !participants.iter().any(|p| p == sender_id) {
        return Ok(vec![]);
    }

    let index_id = room_messages(state, room_id)
        .last()
        .and_then(|m| m.get("indexId").and_then(Value::as_i64))
        .map_or(0, |max| max + 1);

    let other_user = participants
        .iter()
        .find(|p| *p != sender_id)
        .and_then(|p| state.users.get(p))
        .map_or(Value::Null, |props| Value::Object(props.clone()));

    let mut message = Props::new();
    message.insert("id".into(), json!(message_id));
    message.insert("roomId".into(), json!(room_id));
    message.insert("senderId".into(), json!(sender_id));
    message.insert("content".into(), json!(content));
    message.insert("indexId".into(), json!(index_id));
    message.insert("distributed".into(), json!(false));
    message.insert("seen".into(), json!(false));
    message.insert("createdAt".into(), now());
    state.messages.insert(message_id.to_owned(), message.clone());

    Ok(vec![Record::from(json!({
        "message": with_field(&message, "otherUser", other_user),
    }))])
}

fn list_messages(state: &GraphState, params: &Value) -> Result<Vec<Record>> {
    let room_id = param_str(params, "roomId")?;
    let user_id = param_str(params, "userId")?;
    let Some(participants) = state.rooms.get(room_id) else {
        return Ok(vec![]);
    };
    if !participants.iter().any(|p| p == user_id) {
        return Ok(vec![]);
    }
    Ok(room_messages(state, room_id)
        .into_iter()
        .map(|message| Record::from(json!({ "message": Value::Object(message.clone()) })))
        .collect())
}

fn message_id_params(params: &Value) -> Vec<String> {
    params
        .get("messageIds")
        .and_then(Value::as_array)
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn set_distributed(state: &mut GraphState, params: &Value) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for id in message_id_params(params) {
        if let Some(message) = state.messages.get_mut(&id) {
            message.insert("distributed".into(), json!(true));
            records.push(Record::from(json!({ "m": Value::Object(message.clone()) })));
        }
    }
    Ok(records)
}

fn mark_seen(state: &mut GraphState, params: &Value) -> Result<Vec<Record>> {
    let user_id = param_str(params, "userId")?;
    let mut records = Vec::new();
    for id in message_id_params(params) {
        if let Some(message) = state.messages.get_mut(&id) {
            if message.get("senderId").and_then(Value::as_str) == Some(user_id) {
                continue;
            }
            message.insert("seen".into(), json!(true));
            records.push(Record::from(json!({ "m": Value::Object(message.clone()) })));
        }
    }
    Ok(records)
}

fn unread_rooms(state: &GraphState, params: &Value) -> Result<Vec<Record>> {
    let user_id = param_str(params, "userId")?;
    let count = state
        .rooms
        .iter()
        .filter(|(_, participants)| participants.iter().any(|p| p == user_id))
        .filter(|(room_id, _)| {
            room_messages(state, room_id).iter().any(|m| {
                m.get("senderId").and_then(Value::as_str) != Some(user_id)
                    && m.get("seen").and_then(Value::as_bool) == Some(false)
            })
        })
        .count();
    Ok(vec![Record::from(json!({ "unreadCount": count as i64 }))])
}
