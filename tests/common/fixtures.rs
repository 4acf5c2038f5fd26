use chrono::{DateTime, Duration, TimeZone, Utc};

use curriculum_scheduler::scheduler::types::{Concept, MasteryRecord};
use curriculum_scheduler::{CurriculumScheduler, SchedulerConfig};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 12, 0, 0, 0).unwrap()
}

pub fn scheduler() -> CurriculumScheduler {
    CurriculumScheduler::new(SchedulerConfig::default()).expect("default config is valid")
}

pub fn concept(id: &str, prerequisites: &[&str]) -> Concept {
    Concept::new(id).with_prerequisites(prerequisites)
}

/// 按输入顺序逐日递增 created_at 的概念序列
pub fn dated_concepts(specs: &[(&str, &[&str])]) -> Vec<Concept> {
    let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    specs
        .iter()
        .enumerate()
        .map(|(idx, (id, prerequisites))| {
            concept(id, prerequisites).with_created_at(base + Duration::days(idx as i64))
        })
        .collect()
}

pub fn row(concept_id: &str, score: f64, due_in_days: Option<i64>) -> MasteryRecord {
    MasteryRecord::new(
        concept_id,
        score,
        due_in_days.map(|days| fixed_now() + Duration::days(days)),
    )
}
