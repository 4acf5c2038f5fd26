//! 快照回放：读取协作方导出的 JSON 快照，重放排序、选择、状态与每日计划

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EngineError;
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::curriculum::attach_prerequisites;
use crate::scheduler::engine::CurriculumScheduler;
use crate::scheduler::types::{
    Concept, DailySessionPlan, MasteryRecord, PrerequisiteEdge, Selection, StatusEntry,
};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub now: DateTime<Utc>,
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub prerequisites: Vec<PrerequisiteEdge>,
    #[serde(default)]
    pub mastery: Vec<MasteryRecord>,
    /// 快照自带的引擎配置，优先于环境配置
    #[serde(default)]
    pub config: Option<SchedulerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub now: DateTime<Utc>,
    pub order: Vec<String>,
    pub selection: Option<Selection>,
    pub statuses: Vec<StatusEntry>,
    pub plan: DailySessionPlan,
}

pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, ReplayError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn replay(snapshot: Snapshot, fallback_config: SchedulerConfig) -> Result<ReplayReport, ReplayError> {
    let Snapshot {
        now,
        mut concepts,
        prerequisites,
        mastery,
        config,
    } = snapshot;

    let scheduler = CurriculumScheduler::new(config.unwrap_or(fallback_config))?;
    attach_prerequisites(&mut concepts, &prerequisites);

    let order = scheduler.order(&concepts)?;
    let selection = scheduler.select_next(&concepts, &mastery, now)?;
    let statuses = scheduler.classify(&concepts, &mastery, now)?;
    let plan = scheduler.plan_session(&concepts, &mastery, now)?;

    tracing::info!(
        concepts = concepts.len(),
        mastery_rows = mastery.len(),
        selected = selection.as_ref().map(|s| s.concept_id.as_str()).unwrap_or("-"),
        "Snapshot replayed"
    );

    Ok(ReplayReport {
        now,
        order,
        selection,
        statuses,
        plan,
    })
}

pub fn replay_file(
    path: impl AsRef<Path>,
    fallback_config: SchedulerConfig,
) -> Result<ReplayReport, ReplayError> {
    replay(load_snapshot(path)?, fallback_config)
}
