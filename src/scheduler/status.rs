use chrono::{DateTime, Utc};

use crate::scheduler::config::ScoreScaleConfig;
use crate::scheduler::curriculum::curriculum_order;
use crate::scheduler::mastery::{is_mastered, mastery_level};
use crate::scheduler::types::{Concept, ConceptStatus, MasteryRecord, StatusEntry};
use crate::scheduler::unlock::{is_unlocked, mastery_scores, records_by_concept};

/// 优先级：Mastered > Locked > In Review（已排期）> Available
pub fn derive_status(unlocked: bool, mastered: bool, record: Option<&MasteryRecord>) -> ConceptStatus {
    if mastered {
        ConceptStatus::Mastered
    } else if !unlocked {
        ConceptStatus::Locked
    } else if record.is_some_and(|r| r.next_review_at.is_some()) {
        ConceptStatus::InReview
    } else {
        ConceptStatus::Available
    }
}

/// 为整个课程快照生成展示状态，按课程顺序返回，每个概念一条
pub fn classify(
    concepts: &[Concept],
    mastery_rows: &[MasteryRecord],
    now: DateTime<Utc>,
    scale: &ScoreScaleConfig,
) -> Vec<StatusEntry> {
    let scores = mastery_scores(mastery_rows);
    let records = records_by_concept(mastery_rows);

    curriculum_order(concepts)
        .into_iter()
        .map(|concept| {
            let record = records.get(concept.id.as_str()).copied();
            let score = record.map(|r| r.mastery_score);
            let unlocked = is_unlocked(concept, &scores, scale);
            let mastered = score.is_some_and(|s| is_mastered(s, scale));

            StatusEntry {
                concept_id: concept.id.clone(),
                title: concept.title.clone(),
                track: concept.track.clone(),
                prerequisite_ids: concept.prerequisite_ids.clone(),
                created_at: concept.created_at,
                status: derive_status(unlocked, mastered, record),
                mastery_score: score,
                mastery_level: score.map(|s| mastery_level(s, scale)).unwrap_or(0),
                next_review_at: record.and_then(|r| r.next_review_at),
                unlocked,
                mastered,
                due: record.is_some_and(|r| r.is_due(now)),
            }
        })
        .collect()
}
