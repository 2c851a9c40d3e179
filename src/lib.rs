// KiddieFlix - Library Entry Point

pub mod constants;
pub mod error;
pub mod db;
pub mod identity;
pub mod catalog;
pub mod state;
pub mod transfer;
pub mod player;

pub use catalog::{Targeting, Video};
pub use db::{KeyValueStore, MemoryStore, SqliteStore};
pub use error::{KiddieError, Result};
pub use identity::{Profile, ProfileEdit};
pub use state::AppState;
pub use transfer::{ExportDocument, ImportPayload, ImportSummary};
