//! Chat message distribution: atomic per-room index assignment, one-way
//! delivery-state transitions, post-commit event fan-out.

pub mod actions;
pub mod events;
pub mod models;
