//! Declarative authorization for the operation boundary.
//!
//! Rules are named async predicates over a per-operation [`RuleContext`];
//! [`RuleExpr`] composes them with `and`/`or`/`not` plus the terminal
//! decisions `Allow`/`Deny`. The [`PolicyTree`] maps (type, operation) to a
//! rule expression and the [`Guard`] evaluates it before a domain action
//! opens its write transaction.
//!
//! Fail-closed: a fault inside a rule's read transaction resolves to a
//! denial while the fault itself is logged for diagnostics.

pub mod context;
pub mod guard;
pub mod permissions;
pub mod policy;
pub mod rules;

pub use context::{RuleContext, Viewer};
pub use guard::Guard;
pub use policy::{PolicyTree, DEFAULT_FALLBACK};
pub use rules::{evaluate, CachePolicy, CheckFn, Rule, RuleExpr};
