//! Static mapping from (domain type, operation name) to a rule expression.

use std::collections::HashMap;

use super::rules::RuleExpr;

/// The decision applied when no type/operation entry matches.
///
/// Deny by default: a newly added operation is closed until someone writes a
/// policy entry for it. Changing the security posture of the whole surface
/// is this one line.
pub const DEFAULT_FALLBACK: RuleExpr = RuleExpr::Deny;

#[derive(Debug, Default)]
struct TypePolicy {
    operations: HashMap<&'static str, RuleExpr>,
    wildcard: Option<RuleExpr>,
}

/// Lookup order: exact (type, operation) entry, else the type's `'*'`
/// wildcard, else the global fallback.
#[derive(Debug)]
pub struct PolicyTree {
    types: HashMap<&'static str, TypePolicy>,
    fallback: RuleExpr,
}

impl PolicyTree {
    pub fn new(fallback: RuleExpr) -> Self {
        Self {
            types: HashMap::new(),
            fallback,
        }
    }

    /// Bind one operation to a rule expression.
    pub fn operation(
        mut self,
        type_name: &'static str,
        operation: &'static str,
        expr: impl Into<RuleExpr>,
    ) -> Self {
        self.types
            .entry(type_name)
            .or_default()
            .operations
            .insert(operation, expr.into());
        self
    }

    /// Bind the type-level `'*'` wildcard.
    pub fn wildcard(mut self, type_name: &'static str, expr: impl Into<RuleExpr>) -> Self {
        self.types.entry(type_name).or_default().wildcard = Some(expr.into());
        self
    }

    pub fn resolve(&self, type_name: &str, operation: &str) -> &RuleExpr {
        match self.types.get(type_name) {
            Some(policy) => policy
                .operations
                .get(operation)
                .or(policy.wildcard.as_ref())
                .unwrap_or(&self.fallback),
            None => &self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_exact_then_wildcard_then_fallback() {
        let tree = PolicyTree::new(DEFAULT_FALLBACK)
            .operation("Query", "Group", RuleExpr::Allow)
            .wildcard("Query", RuleExpr::Deny)
            .operation("Mutation", "JoinGroup", RuleExpr::Allow);

        assert!(matches!(tree.resolve("Query", "Group"), RuleExpr::Allow));
        // Unknown operation under a type with a wildcard
        assert!(matches!(tree.resolve("Query", "statistics"), RuleExpr::Deny));
        // Type without a wildcard falls through to the global default
        assert!(matches!(
            tree.resolve("Mutation", "DeleteEverything"),
            RuleExpr::Deny
        ));
        // Unknown type
        assert!(matches!(tree.resolve("Subscription", "anything"), RuleExpr::Deny));
    }
}
