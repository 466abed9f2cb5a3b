//! Schema-less JSON records persisted as one ordered collection.

pub mod identity;
pub mod store;

/// One record: an insertion-ordered JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

pub use store::{FileRecordStore, RecordStore};
