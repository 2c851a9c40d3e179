// Database module

pub mod app_db;
pub mod store;

pub use store::{KeyValueStore, MemoryStore, SqliteStore};
