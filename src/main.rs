use std::process::ExitCode;

use curriculum_scheduler::config::Config;
use curriculum_scheduler::logging::{init_tracing, LogConfig};
use curriculum_scheduler::replay::replay_file;
use curriculum_scheduler::SchedulerConfig;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&LogConfig::from(&config));

    // 命令行参数优先于 SNAPSHOT_PATH
    let Some(snapshot_path) = std::env::args().nth(1).or(config.snapshot_path.clone()) else {
        tracing::error!("No snapshot given: pass a path or set SNAPSHOT_PATH");
        return ExitCode::from(2);
    };

    let engine_config = SchedulerConfig::from_env(&config.engine);
    tracing::info!(path = %snapshot_path, "Replaying snapshot");

    let report = match replay_file(&snapshot_path, engine_config) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, path = %snapshot_path, "Replay failed");
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode replay report");
            ExitCode::FAILURE
        }
    }
}
