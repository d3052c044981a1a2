// Commonsphere - Server Core
//
// Graph-backed social-network domain (users, groups, memberships, rooms,
// chat messages) behind a declarative authorization boundary. Every
// entry-point action resolves a rule expression from the policy tree and
// evaluates it before a write transaction is opened.
//
// The graph store itself is an external collaborator injected behind the
// traits in kernel/graph.rs.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::Config;
