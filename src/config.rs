use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub snapshot_path: Option<String>,
    pub engine: EngineEnvConfig,
}

/// 环境变量对引擎默认配置的覆盖项；未设置时保持默认
#[derive(Debug, Clone, Default)]
pub struct EngineEnvConfig {
    pub unlock_threshold: Option<f64>,
    pub mastered_threshold: Option<f64>,
    pub planner_target_questions: Option<u32>,
    pub planner_max_review_concepts: Option<usize>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            snapshot_path: env::var("SNAPSHOT_PATH").ok().filter(|p| !p.trim().is_empty()),
            engine: EngineEnvConfig {
                unlock_threshold: env_opt_parse("UNLOCK_THRESHOLD"),
                mastered_threshold: env_opt_parse("MASTERED_THRESHOLD"),
                planner_target_questions: env_opt_parse("PLANNER_TARGET_QUESTIONS"),
                planner_max_review_concepts: env_opt_parse("PLANNER_MAX_REVIEW_CONCEPTS"),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    env_opt_parse(key).unwrap_or(default)
}

pub fn env_opt_parse<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                None
            }
        },
        Err(_) => None,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
