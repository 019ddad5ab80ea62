pub mod context;
pub mod performance;
pub mod scene;
pub mod scheduler;
pub mod time;
pub mod tuning;
