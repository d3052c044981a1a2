use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::common::entity_ids::UserId;
use crate::common::roles::UserRole;
use crate::kernel::graph::GraphStore;

/// The authenticated caller, as established by the session layer.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub id: UserId,
    pub role: UserRole,
}

impl Viewer {
    pub fn new(id: UserId, role: UserRole) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self.role, UserRole::Moderator | UserRole::Admin)
    }
}

/// Per-operation evaluation context handed to every rule predicate.
///
/// One context is built per inbound operation and dropped with it, so the
/// contextual memo table never leaks decisions across requests. Predicates
/// read the caller identity (absent for anonymous calls), the operation
/// arguments, the resolved parent entity for field-level rules, and may open
/// read transactions through the graph capability.
pub struct RuleContext {
    viewer: Option<Viewer>,
    args: Value,
    graph: Arc<dyn GraphStore>,
    parent: Option<Value>,
    memo: Mutex<HashMap<&'static str, bool>>,
}

impl RuleContext {
    pub fn new(viewer: Option<Viewer>, args: Value, graph: Arc<dyn GraphStore>) -> Self {
        Self {
            viewer,
            args,
            graph,
            parent: None,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Attach the resolved parent entity (field-level rules only).
    pub fn with_parent(mut self, parent: Value) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_ref()
    }

    pub fn args(&self) -> &Value {
        &self.args
    }

    pub fn parent(&self) -> Option<&Value> {
        self.parent.as_ref()
    }

    pub fn graph(&self) -> Arc<dyn GraphStore> {
        self.graph.clone()
    }

    /// String argument by name, e.g. `groupId`.
    pub fn arg_str(&self, name: &str) -> Option<&str> {
        self.args.get(name).and_then(Value::as_str)
    }

    pub(crate) async fn memo_get(&self, rule: &'static str) -> Option<bool> {
        self.memo.lock().await.get(rule).copied()
    }

    pub(crate) async fn memo_put(&self, rule: &'static str, decision: bool) {
        self.memo.lock().await.insert(rule, decision);
    }
}
