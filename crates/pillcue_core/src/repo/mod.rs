//! Persistence layer.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the reminder store.
//! - Isolate SQLite query details from service orchestration.

pub mod kv_store;
