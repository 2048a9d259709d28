pub mod activity_model;
pub mod activity_service;
pub mod activity_traits;

pub use activity_model::*;
pub use activity_service::{ActivityService, ActivityServiceTrait, FlushReport};
pub use activity_traits::{
    ActivityLogRepositoryTrait, ActivityUploaderTrait, MemoryActivityLogRepository,
};
