pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod replay;
pub mod scheduler;

pub use error::{EngineError, Result};
pub use scheduler::config::SchedulerConfig;
pub use scheduler::engine::CurriculumScheduler;
