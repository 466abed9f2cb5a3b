//! Shared building blocks for the record store workspace:
//! logging setup, startup environment checks and small wire types.

pub mod types;
pub mod utils;
pub mod env;
