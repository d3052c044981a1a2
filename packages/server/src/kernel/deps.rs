//! Server dependencies for entry-point actions.
//!
//! One explicitly constructed container instead of process-wide singletons:
//! the composition root builds a `ServerDeps` and hands it to every action.

use std::sync::Arc;

use crate::common::auth::{permissions, Guard};
use crate::config::Config;
use crate::kernel::event_bus::EventBus;
use crate::kernel::graph::GraphStore;

/// Dependency container built once at the composition root.
#[derive(Clone)]
pub struct ServerDeps {
    /// The external transactional graph store.
    pub graph: Arc<dyn GraphStore>,
    /// In-process pub/sub for post-commit event fan-out.
    pub event_bus: EventBus,
    pub config: Config,
    /// Operation boundary: policy tree + rule evaluation.
    pub guard: Arc<Guard>,
}

impl ServerDeps {
    /// Create new ServerDeps with the application policy table installed.
    pub fn new(graph: Arc<dyn GraphStore>, event_bus: EventBus, config: Config) -> Self {
        Self {
            graph,
            event_bus,
            config,
            guard: Arc::new(Guard::new(permissions::policy_tree())),
        }
    }
}
