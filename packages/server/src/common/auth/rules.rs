//! Rule values and the recursive expression evaluator.
//!
//! A rule is a named value pairing a cache-policy tag with an async
//! predicate; composition is a small closed set of tagged variants over rule
//! values. No dynamic dispatch on rule "objects" - one evaluator walks the
//! expression.

use anyhow::Result;
use futures::future::BoxFuture;

use super::context::RuleContext;

/// Async predicate signature. Named functions coerce to this pointer type,
/// which is what lets rules live in `static` items.
pub type CheckFn = for<'a> fn(&'a RuleContext) -> BoxFuture<'a, Result<bool>>;

/// Memoization policy for one rule within one evaluation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Re-evaluate on every appearance, even within one context.
    None,
    /// Evaluate once per (rule, context) pair; later appearances within the
    /// same inbound operation reuse the memoized decision.
    Contextual,
    /// Never memoize. For predicates that read state a composed write may
    /// have changed since the previous sub-evaluation.
    NoCache,
}

/// A named boolean predicate over the evaluation context.
///
/// Stateless by construction: cache state lives in the context, never here,
/// so rule values are safely shared across concurrent operations.
pub struct Rule {
    pub name: &'static str,
    pub cache: CachePolicy,
    pub check: CheckFn,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

/// A rule expression: a rule, a terminal decision, or a boolean combination.
#[derive(Debug, Clone)]
pub enum RuleExpr {
    /// Constant decision "allow".
    Allow,
    /// Constant decision "deny".
    Deny,
    Rule(&'static Rule),
    And(Vec<RuleExpr>),
    Or(Vec<RuleExpr>),
    Not(Box<RuleExpr>),
}

impl From<&'static Rule> for RuleExpr {
    fn from(rule: &'static Rule) -> Self {
        RuleExpr::Rule(rule)
    }
}

/// `and(r1, r2, ...)` - true iff every sub-rule is true.
pub fn and(exprs: Vec<RuleExpr>) -> RuleExpr {
    RuleExpr::And(exprs)
}

/// `or(r1, r2, ...)` - true iff any sub-rule is true.
pub fn or(exprs: Vec<RuleExpr>) -> RuleExpr {
    RuleExpr::Or(exprs)
}

/// `not(r)`.
pub fn not(expr: RuleExpr) -> RuleExpr {
    RuleExpr::Not(Box::new(expr))
}

/// Evaluate a rule expression against one context.
///
/// `And` short-circuits on the first false, `Or` on the first true. Faults
/// propagate as `Err` rather than mapping to a boolean here - otherwise a
/// surrounding `Not` could turn a store fault into an allow. The guard at
/// the operation boundary converts `Err` into a denial.
pub fn evaluate<'a>(expr: &'a RuleExpr, ctx: &'a RuleContext) -> BoxFuture<'a, Result<bool>> {
    Box::pin(async move {
        match expr {
            RuleExpr::Allow => Ok(true),
            RuleExpr::Deny => Ok(false),
            RuleExpr::Rule(rule) => evaluate_rule(rule, ctx).await,
            RuleExpr::And(exprs) => {
                for sub in exprs {
                    if !evaluate(sub, ctx).await? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RuleExpr::Or(exprs) => {
                for sub in exprs {
                    if evaluate(sub, ctx).await? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            RuleExpr::Not(inner) => Ok(!evaluate(inner, ctx).await?),
        }
    })
}

async fn evaluate_rule(rule: &'static Rule, ctx: &RuleContext) -> Result<bool> {
    if rule.cache == CachePolicy::Contextual {
        if let Some(memoized) = ctx.memo_get(rule.name).await {
            return Ok(memoized);
        }
    }

    let decision = (rule.check)(ctx).await?;

    if rule.cache == CachePolicy::Contextual {
        ctx.memo_put(rule.name, decision).await;
    }

    Ok(decision)
}
