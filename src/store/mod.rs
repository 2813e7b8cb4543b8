//! Persistence boundary for workflow records.
//!
//! Mirrors what a cloud document store offers: create with a generated id,
//! point fetch, equality/range queries over schemaless records, shallow
//! partial updates, and listener-style subscriptions. The backend cannot
//! combine a range filter with an order-by without a pre-declared composite
//! index, so callers must never rely on result ordering beyond insertion
//! order; any display ordering happens client-side after the fetch.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use std::cmp::Ordering;

pub use memory::MemoryStore;

/// A record as the store returns it: the assigned id plus the document body
/// (always a JSON object).
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

/// One equality/range predicate on a document field. Documents missing the
/// field never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte,
            value: value.into(),
        }
    }

    pub fn matches(&self, fields: &Value) -> bool {
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Gte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lte => matches!(
                compare_values(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

/// Range comparison over the two value shapes the workflow stores: strings
/// (dates, timestamps, status) compare lexicographically, numbers
/// numerically. Mixed or non-scalar operands do not compare.
fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => {
            a.as_f64().and_then(|a| b.as_f64().and_then(|b| a.partial_cmp(&b)))
        }
        _ => None,
    }
}

/// Stream of full result-set snapshots for a subscription: the current
/// matching set is emitted immediately, then again after every mutation that
/// touches the collection.
pub type SnapshotStream = BoxStream<'static, Vec<Document>>;

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a record and return the id the store assigned to it.
    async fn create(&self, collection: &str, fields: Value) -> Result<String>;

    /// Point lookup by document id.
    async fn fetch(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Equality/range query. Results arrive in insertion order; the store
    /// never sorts on the caller's behalf.
    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>>;

    /// Shallow merge of `patch` into an existing document. Fails when the id
    /// is unknown.
    async fn update_partial(&self, collection: &str, id: &str, patch: Value) -> Result<()>;

    /// Listener-style live query over the same predicates as [`Self::query`].
    async fn subscribe(&self, collection: &str, filters: Vec<Filter>) -> Result<SnapshotStream>;
}
