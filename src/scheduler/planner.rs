//! 每日学习计划：在固定题量预算内分配一个新概念与若干到期复习概念

use chrono::{DateTime, Utc};

use crate::constants::{DATE_KEY_FORMAT, TRACK_SEED_MODULUS};
use crate::scheduler::config::{PlannerConfig, ScoreScaleConfig, TrackWeight};
use crate::scheduler::curriculum::{curriculum_order, order_position_by_id};
use crate::scheduler::mastery::{level_floor_score, mastery_level};
use crate::scheduler::types::{
    AllocationKind, Concept, DailySessionPlan, MasteryRecord, QuestionAllocation,
};
use crate::scheduler::unlock::{is_unlocked_at, mastery_scores, records_by_concept};

pub fn date_key(now: DateTime<Utc>) -> String {
    now.format(DATE_KEY_FORMAT).to_string()
}

/// 日期键中的数字拼接为种子，映射到 [0,1) 的选择点
pub fn track_pick(date_key: &str) -> f64 {
    let seed = date_key
        .chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0_u64, |acc, d| acc.wrapping_mul(10).wrapping_add(u64::from(d)));
    (seed % TRACK_SEED_MODULUS) as f64 / TRACK_SEED_MODULUS as f64
}

/// 确定性的加权轨道选择：同一日期键总是得到同一下标，权重和为 0 时返回 None
pub fn weighted_track_index(date_key: &str, weights: &[TrackWeight]) -> Option<usize> {
    let total: f64 = weights.iter().map(|w| w.weight).sum();
    if weights.is_empty() || total <= 0.0 {
        return None;
    }

    let pick = track_pick(date_key);
    let mut running = 0.0;
    for (idx, item) in weights.iter().enumerate() {
        running += item.weight / total;
        if pick <= running {
            return Some(idx);
        }
    }
    Some(weights.len() - 1)
}

pub fn choose_track<'a>(date_key: &str, weights: &'a [TrackWeight]) -> Option<&'a str> {
    weighted_track_index(date_key, weights).map(|idx| weights[idx].track.as_str())
}

/// 按 max(最少题量, 总量 - 每复习扣减 * 复习数) 给新概念，余量平均分给复习概念（每个至少 1 题）
pub fn allocate_questions(
    total_questions: u32,
    new_concept_id: Option<&str>,
    review_concept_ids: &[String],
    config: &PlannerConfig,
) -> Vec<QuestionAllocation> {
    let review_count = review_concept_ids.len() as u32;
    let mut allocations = Vec::with_capacity(review_concept_ids.len() + 1);

    let review_budget = match new_concept_id {
        Some(concept_id) => {
            let reserved = review_count.saturating_mul(config.questions_per_review);
            let new_count = config
                .min_new_concept_questions
                .max(total_questions.saturating_sub(reserved));
            allocations.push(QuestionAllocation {
                concept_id: concept_id.to_string(),
                question_count: new_count,
                kind: AllocationKind::New,
            });
            total_questions.saturating_sub(new_count)
        }
        None => total_questions,
    };

    if review_budget > 0 && review_count > 0 {
        let per_review = (review_budget / review_count).max(1);
        allocations.extend(review_concept_ids.iter().map(|concept_id| QuestionAllocation {
            concept_id: concept_id.clone(),
            question_count: per_review,
            kind: AllocationKind::Review,
        }));
    }

    allocations
}

pub fn build_daily_plan(
    concepts: &[Concept],
    records: &[MasteryRecord],
    now: DateTime<Utc>,
    config: &PlannerConfig,
    scale: &ScoreScaleConfig,
) -> DailySessionPlan {
    let ordered = curriculum_order(concepts);
    let position_by_id = order_position_by_id(&ordered);
    let scores = mastery_scores(records);
    let record_by_id = records_by_concept(records);

    let mut due: Vec<(&MasteryRecord, usize)> = record_by_id
        .values()
        .filter_map(|record| {
            let position = *position_by_id.get(record.concept_id.as_str())?;
            let reviewable = mastery_level(record.mastery_score, scale) > 0 && record.is_due(now);
            reviewable.then_some((*record, position))
        })
        .collect();
    due.sort_by(|(a, a_pos), (b, b_pos)| {
        a.next_review_at
            .cmp(&b.next_review_at)
            .then_with(|| a_pos.cmp(b_pos))
    });
    let review_concept_ids: Vec<String> = due
        .into_iter()
        .take(config.max_review_concepts)
        .map(|(record, _)| record.concept_id.clone())
        .collect();

    let prerequisite_score = level_floor_score(config.prerequisite_level, scale);
    let unseen: Vec<&Concept> = ordered
        .into_iter()
        .filter(|concept| {
            let unseen = record_by_id
                .get(concept.id.as_str())
                .map_or(true, |record| mastery_level(record.mastery_score, scale) == 0);
            unseen && is_unlocked_at(*concept, &scores, prerequisite_score)
        })
        .collect();

    let date = date_key(now);
    let preferred_track = choose_track(&date, &config.track_weights);
    let new_concept = unseen
        .iter()
        .find(|concept| preferred_track.is_some() && concept.track.as_deref() == preferred_track)
        .or_else(|| unseen.first())
        .map(|concept| concept.id.clone());

    let total_questions = config.total_questions();
    let allocations = allocate_questions(
        total_questions,
        new_concept.as_deref(),
        &review_concept_ids,
        config,
    );

    DailySessionPlan {
        date,
        new_concept_id: new_concept,
        review_concept_ids,
        allocations,
        total_questions,
    }
}
