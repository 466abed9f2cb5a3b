//! Storage abstractions for service layer
//!
//! Contains reusable file-backed stores that persist whole collections as JSON.

pub mod json_array_store;
