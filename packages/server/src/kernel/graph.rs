//! Graph store collaborator traits.
//!
//! The storage engine is external: production wires a Bolt driver behind
//! these traits at the composition root, tests inject the in-memory double
//! from `test_dependencies`. Domain code only ever sees parameterized query
//! text and row-like records - never a concrete driver type.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// A single row projected from a graph query.
///
/// Fields are named as in the query's RETURN clause. Map projections such as
/// `group {.*, myRole: membership.role}` arrive as JSON objects; an
/// OPTIONAL MATCH that found nothing arrives as `null`.
#[derive(Debug, Clone, Default)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// A map-projected entity, or `None` when the field is absent or null.
    pub fn object(&self, field: &str) -> Option<&Map<String, Value>> {
        self.0.get(field).and_then(Value::as_object)
    }

    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn i64_field(&self, field: &str) -> Option<i64> {
        self.0.get(field).and_then(Value::as_i64)
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self(fields),
            _ => Self(Map::new()),
        }
    }
}

/// One transaction against the graph store.
///
/// Reads see a consistent snapshot; writes are staged and only become
/// visible at `commit`. Dropping a transaction without committing releases
/// the underlying session and discards staged writes - cleanup is not
/// optional and must hold on every exit path.
#[async_trait]
pub trait GraphTransaction: Send {
    /// Run one parameterized query and project its records.
    ///
    /// `params` is a JSON object of named parameters; query text never
    /// interpolates untrusted input.
    async fn run(&mut self, query: &str, params: Value) -> Result<Vec<Record>>;

    /// Commit staged writes and release the session.
    async fn commit(&mut self) -> Result<()>;
}

/// The opaque transactional graph store.
///
/// Write transactions are serialized by the store, which is what makes
/// read-then-write sequences inside a single transaction (max message index,
/// membership MERGE) atomic. Read transactions never block writers.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn read_transaction(&self) -> Result<Box<dyn GraphTransaction>>;
    async fn write_transaction(&self) -> Result<Box<dyn GraphTransaction>>;
}

/// Raised by a store when a uniqueness constraint rejects a write
/// (the graph schema keeps `Group.slug` unique).
#[derive(Debug, thiserror::Error)]
#[error("constraint violation: {0}")]
pub struct ConstraintViolation(pub String);
