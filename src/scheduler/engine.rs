use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, Result};
use crate::scheduler::config::SchedulerConfig;
use crate::scheduler::types::*;
use crate::scheduler::{curriculum, mastery, planner, selector, status, unlock};

/// 调度引擎门面：只持有校验过的配置，不保存任何跨调用状态。
///
/// 每次调用先校验快照形状，再交给纯函数计算；并发调用各自传入快照即可。
#[derive(Debug, Clone)]
pub struct CurriculumScheduler {
    config: SchedulerConfig,
}

impl CurriculumScheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn validate_concepts(&self, concepts: &[Concept]) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(concepts.len());
        for concept in concepts {
            if concept.id.trim().is_empty() {
                return Err(EngineError::invalid_input("concept id must not be empty"));
            }
            if !seen.insert(concept.id.as_str()) {
                return Err(EngineError::invalid_input(format!(
                    "duplicate concept id: {}",
                    concept.id
                )));
            }
        }
        Ok(())
    }

    pub fn validate_mastery_rows(&self, rows: &[MasteryRecord]) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(rows.len());
        for row in rows {
            if row.concept_id.trim().is_empty() {
                return Err(EngineError::invalid_input(
                    "mastery row concept id must not be empty",
                ));
            }
            if !row.mastery_score.is_finite() {
                return Err(EngineError::invalid_input(format!(
                    "mastery score for {} is not finite",
                    row.concept_id
                )));
            }
            if !seen.insert(row.concept_id.as_str()) {
                return Err(EngineError::invalid_input(format!(
                    "duplicate mastery row for concept {}",
                    row.concept_id
                )));
            }
        }
        Ok(())
    }

    fn validate_snapshot(&self, concepts: &[Concept], rows: &[MasteryRecord]) -> Result<()> {
        self.validate_concepts(concepts)?;
        self.validate_mastery_rows(rows)
    }

    pub fn order(&self, concepts: &[Concept]) -> Result<Vec<String>> {
        self.validate_concepts(concepts)?;
        Ok(curriculum::order_ids(concepts))
    }

    pub fn is_unlocked(&self, concept: &Concept, rows: &[MasteryRecord]) -> Result<bool> {
        self.validate_mastery_rows(rows)?;
        let scores = unlock::mastery_scores(rows);
        Ok(unlock::is_unlocked(concept, &scores, &self.config.scale))
    }

    pub fn select_next(
        &self,
        concepts: &[Concept],
        rows: &[MasteryRecord],
        now: DateTime<Utc>,
    ) -> Result<Option<Selection>> {
        self.validate_snapshot(concepts, rows)?;

        let selection = selector::select_next(concepts, rows, now, &self.config.scale);
        match &selection {
            Some(picked) => tracing::debug!(
                concept_id = %picked.concept_id,
                source = picked.source.as_str(),
                candidates = concepts.len(),
                "Concept selected"
            ),
            None => tracing::debug!(
                candidates = concepts.len(),
                "No unlocked concept available"
            ),
        }
        Ok(selection)
    }

    pub fn classify(
        &self,
        concepts: &[Concept],
        rows: &[MasteryRecord],
        now: DateTime<Utc>,
    ) -> Result<Vec<StatusEntry>> {
        self.validate_snapshot(concepts, rows)?;

        let statuses = status::classify(concepts, rows, now, &self.config.scale);
        tracing::debug!(
            total = statuses.len(),
            locked = statuses
                .iter()
                .filter(|s| s.status == ConceptStatus::Locked)
                .count(),
            mastered = statuses.iter().filter(|s| s.mastered).count(),
            "Concept statuses derived"
        );
        Ok(statuses)
    }

    pub fn plan_session(
        &self,
        concepts: &[Concept],
        rows: &[MasteryRecord],
        now: DateTime<Utc>,
    ) -> Result<DailySessionPlan> {
        self.validate_snapshot(concepts, rows)?;

        let plan = planner::build_daily_plan(
            concepts,
            rows,
            now,
            &self.config.planner,
            &self.config.scale,
        );
        tracing::debug!(
            date = %plan.date,
            new_concept_id = plan.new_concept_id.as_deref().unwrap_or("-"),
            reviews = plan.review_concept_ids.len(),
            total_questions = plan.total_questions,
            "Daily session plan built"
        );
        Ok(plan)
    }

    pub fn record_attempt(
        &self,
        previous: Option<&MasteryRecord>,
        concept_id: &str,
        attempt_percent: f64,
        now: DateTime<Utc>,
    ) -> Result<MasteryRecord> {
        let updated =
            mastery::record_attempt(previous, concept_id, attempt_percent, now, &self.config)?;
        tracing::debug!(
            concept_id,
            attempt_percent,
            previous_score = previous.map(|r| r.mastery_score),
            mastery_score = updated.mastery_score,
            level = mastery::mastery_level(updated.mastery_score, &self.config.scale),
            "Mastery updated"
        );
        Ok(updated)
    }
}
