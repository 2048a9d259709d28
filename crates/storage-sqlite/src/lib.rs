//! TradePulse SQLite storage - repository implementations for the sync
//! engine's core traits.
//!
//! All access goes through a single store actor that owns the SQLite
//! connection and processes jobs serially, so repository methods never
//! contend on the connection and multi-statement jobs are transactional.

mod activity;
mod cache;
mod db;
mod errors;
mod preferences;

pub use activity::SqliteActivityLogRepository;
pub use cache::SqliteCacheStore;
pub use db::{open, open_in_memory, StoreHandle};
pub use errors::StorageError;
pub use preferences::SqlitePreferenceRepository;
