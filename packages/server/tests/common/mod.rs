// Common test utilities

use std::sync::Arc;

use server_core::common::auth::Viewer;
use server_core::common::{GroupType, UserId, UserRole};
use server_core::domains::groups::actions::{create_group, CreateGroupParams};
use server_core::domains::groups::models::Group;
use server_core::kernel::test_dependencies::InMemoryGraph;
use server_core::kernel::{EventBus, ServerDeps};
use server_core::Config;

/// Test harness wiring `ServerDeps` to an in-memory graph.
///
/// Each test gets its own graph; there is no shared state between tests.
pub struct TestHarness {
    pub graph: Arc<InMemoryGraph>,
    pub deps: ServerDeps,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let graph = Arc::new(InMemoryGraph::new());
        let deps = ServerDeps::new(graph.clone(), EventBus::new(), config);
        Self { graph, deps }
    }

    /// Seed a user node and return a viewer for it.
    pub async fn seed_viewer(&self, name: &str, role: UserRole) -> Viewer {
        let viewer = Viewer::new(UserId::new(), role);
        self.graph.seed_user(viewer.id, name).await;
        viewer
    }

    /// Create a group through the real action; the owner gets its `owner`
    /// membership as part of the write.
    pub async fn seed_group(&self, owner: &Viewer, slug: &str, group_type: GroupType) -> Group {
        create_group(
            CreateGroupParams {
                id: None,
                name: format!("Group {slug}"),
                slug: slug.to_string(),
                description: "A place to talk".to_string(),
                about: None,
                group_type,
                category_ids: None,
            },
            owner,
            &self.deps,
        )
        .await
        .expect("Failed to seed group")
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
