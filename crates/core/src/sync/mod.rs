pub mod coordinator;
pub mod sync_config;
pub mod sync_state_model;


pub use coordinator::SyncCoordinator;
pub use sync_config::SyncConfig;
pub use sync_state_model::*;
