pub mod config;
pub mod curriculum;
pub mod engine;
pub mod mastery;
pub mod planner;
pub mod selector;
pub mod status;
pub mod types;
pub mod unlock;
