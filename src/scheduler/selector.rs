//! 选择今日学习概念：到期复习 > 未学新概念 > 兜底复习，每一层内规则确定

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::scheduler::config::ScoreScaleConfig;
use crate::scheduler::curriculum::curriculum_order;
use crate::scheduler::types::{Concept, MasteryRecord, Selection, SelectionSource};
use crate::scheduler::unlock::{is_unlocked, mastery_scores, records_by_concept};

struct Candidate<'a> {
    concept_id: &'a str,
    position: usize,
    record: &'a MasteryRecord,
}

fn due_review_cmp(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.record
        .next_review_at
        .cmp(&b.record.next_review_at)
        .then_with(|| a.record.mastery_score.total_cmp(&b.record.mastery_score))
        .then_with(|| a.position.cmp(&b.position))
}

/// 未排期（None）优先于已排期
fn review_at_nulls_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.cmp(&b),
    }
}

fn fallback_cmp(a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
    a.record
        .mastery_score
        .total_cmp(&b.record.mastery_score)
        .then_with(|| review_at_nulls_first(a.record.next_review_at, b.record.next_review_at))
        .then_with(|| a.position.cmp(&b.position))
}

/// 在已按课程顺序排列且已解锁的候选中选出一个概念。
///
/// 调用方需保证 `ordered_unlocked` 已经过解锁过滤；这里的下标即课程顺序位置。
pub fn select_from_unlocked(
    ordered_unlocked: &[&Concept],
    records: &HashMap<&str, &MasteryRecord>,
    now: DateTime<Utc>,
) -> Option<Selection> {
    let mut due: Vec<Candidate<'_>> = Vec::new();
    let mut seen: Vec<Candidate<'_>> = Vec::new();
    let mut first_unseen: Option<&str> = None;

    for (position, concept) in ordered_unlocked.iter().enumerate() {
        match records.get(concept.id.as_str()) {
            Some(&record) => {
                let candidate = Candidate {
                    concept_id: concept.id.as_str(),
                    position,
                    record,
                };
                if record.is_due(now) {
                    due.push(candidate);
                } else {
                    seen.push(candidate);
                }
            }
            None => {
                if first_unseen.is_none() {
                    first_unseen = Some(concept.id.as_str());
                }
            }
        }
    }

    if let Some(best) = due.iter().min_by(|a, b| due_review_cmp(a, b)) {
        return Some(Selection {
            concept_id: best.concept_id.to_string(),
            source: SelectionSource::DueReview,
        });
    }

    if let Some(concept_id) = first_unseen {
        return Some(Selection {
            concept_id: concept_id.to_string(),
            source: SelectionSource::NewConcept,
        });
    }

    seen.iter()
        .min_by(|a, b| fallback_cmp(a, b))
        .map(|best| Selection {
            concept_id: best.concept_id.to_string(),
            source: SelectionSource::Fallback,
        })
}

/// 对完整课程快照做排序、解锁过滤并选择；无可选概念时返回 None
pub fn select_next(
    concepts: &[Concept],
    mastery_rows: &[MasteryRecord],
    now: DateTime<Utc>,
    scale: &ScoreScaleConfig,
) -> Option<Selection> {
    let scores = mastery_scores(mastery_rows);
    let records = records_by_concept(mastery_rows);
    let unlocked: Vec<&Concept> = curriculum_order(concepts)
        .into_iter()
        .filter(|concept| is_unlocked(*concept, &scores, scale))
        .collect();

    select_from_unlocked(&unlocked, &records, now)
}
