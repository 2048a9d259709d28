pub mod preferences_model;
pub mod preferences_service;
pub mod preferences_traits;


pub use preferences_model::*;
pub use preferences_service::{PreferenceService, PreferenceServiceTrait};
pub use preferences_traits::{MemoryPreferenceRepository, PreferenceRepositoryTrait};
