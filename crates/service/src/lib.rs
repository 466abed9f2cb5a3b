//! Service layer for the record store.
//! - `storage`: generic file-backed JSON collections.
//! - `records`: identity policy and the CRUD operations exposed over HTTP.
//! - Errors are reported through `errors::ServiceError`.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod records;
