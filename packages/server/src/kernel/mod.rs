pub mod deps;
pub mod event_bus;
pub mod graph;
pub mod test_dependencies;

pub use deps::ServerDeps;
pub use event_bus::EventBus;
pub use graph::{ConstraintViolation, GraphStore, GraphTransaction, Record};

/// Install the global tracing subscriber. Safe to call more than once.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}
