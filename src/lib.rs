// Tasklist - Single-list to-do manager with a persistent local snapshot

pub mod filter;
pub mod models;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod tier;

// Re-export main types for convenience
pub use filter::Filter;
pub use models::{Task, TaskId};
pub use storage::{FileStorage, MemoryStorage, SqliteStorage, Storage};
pub use store::TaskStore;
pub use tier::Tier;
