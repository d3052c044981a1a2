use tracing::{debug, error};

use super::context::RuleContext;
use super::policy::PolicyTree;
use super::rules::evaluate;
use crate::common::errors::AppError;

/// The operation boundary: resolves the policy entry for an operation and
/// evaluates it before any domain write runs.
pub struct Guard {
    tree: PolicyTree,
}

impl Guard {
    pub fn new(tree: PolicyTree) -> Self {
        Self { tree }
    }

    /// Evaluate the rule expression bound to `(type_name, operation)`.
    ///
    /// A plain denial and a faulted evaluation both surface as
    /// `AuthorizationDenied` - fail-closed, with no detail about which rule
    /// failed. The fault itself still reaches the log as the diagnostics
    /// channel.
    pub async fn assert(
        &self,
        type_name: &str,
        operation: &str,
        ctx: &RuleContext,
    ) -> Result<(), AppError> {
        let expr = self.tree.resolve(type_name, operation);
        match evaluate(expr, ctx).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(type_name, operation, "operation denied by policy");
                Err(AppError::AuthorizationDenied)
            }
            Err(fault) => {
                error!(
                    type_name,
                    operation,
                    error = ?fault,
                    "rule evaluation faulted; denying operation"
                );
                Err(AppError::AuthorizationDenied)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::auth::policy::DEFAULT_FALLBACK;
    use crate::common::auth::rules::{CachePolicy, CheckFn, Rule, RuleExpr};
    use crate::common::auth::Viewer;
    use crate::common::roles::UserRole;
    use crate::common::UserId;
    use crate::kernel::test_dependencies::InMemoryGraph;
    use futures::future::BoxFuture;
    use std::sync::Arc;

    fn faulting_check(_ctx: &RuleContext) -> BoxFuture<'_, anyhow::Result<bool>> {
        Box::pin(async move { Err(anyhow::anyhow!("bolt connection reset")) })
    }

    static FAULTING: Rule = Rule {
        name: "faulting",
        cache: CachePolicy::NoCache,
        check: faulting_check as CheckFn,
    };

    fn ctx() -> RuleContext {
        RuleContext::new(
            Some(Viewer::new(UserId::new(), UserRole::User)),
            serde_json::json!({}),
            Arc::new(InMemoryGraph::new()),
        )
    }

    #[tokio::test]
    async fn allows_when_rule_passes() {
        let guard = Guard::new(
            PolicyTree::new(DEFAULT_FALLBACK).operation("Query", "Group", RuleExpr::Allow),
        );
        assert!(guard.assert("Query", "Group", &ctx()).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_operation_is_denied() {
        let guard = Guard::new(PolicyTree::new(DEFAULT_FALLBACK));
        let result = guard.assert("Mutation", "NewlyAdded", &ctx()).await;
        assert!(matches!(result, Err(AppError::AuthorizationDenied)));
    }

    #[tokio::test]
    async fn fault_is_mapped_to_denial() {
        let guard = Guard::new(
            PolicyTree::new(DEFAULT_FALLBACK)
                .operation("Mutation", "JoinGroup", RuleExpr::Rule(&FAULTING)),
        );
        let result = guard.assert("Mutation", "JoinGroup", &ctx()).await;
        assert!(matches!(result, Err(AppError::AuthorizationDenied)));
    }
}
