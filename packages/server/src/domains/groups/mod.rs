//! Group membership domain: group creation, joining, and the membership
//! role state machine, all gated by the rules in [`rules`].

pub mod actions;
pub mod events;
pub mod models;
pub mod rules;
