//! Persistent key-value store and durable message queue.
//!
//! `SqliteStore` is the production backend. `MemoryStore` has the same
//! semantics without persistence and backs the notifier tests.

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
