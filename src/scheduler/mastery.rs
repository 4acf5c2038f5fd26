use chrono::{DateTime, Duration, Utc};

use crate::constants::{MAX_ATTEMPT_PERCENT, MAX_MASTERY_LEVEL, MAX_UNMASTERED_LEVEL};
use crate::scheduler::config::{BlendConfig, ReviewScheduleConfig, SchedulerConfig, ScoreScaleConfig};
use crate::scheduler::types::MasteryRecord;
use crate::error::{EngineError, Result};

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// 加权滑动平均：旧分数占 previous_weight，新一次得分占 attempt_weight
pub fn blend(previous_score: f64, attempt_percent: f64, config: &BlendConfig) -> f64 {
    let attempt_ratio = attempt_percent / MAX_ATTEMPT_PERCENT;
    let blended = config.previous_weight * previous_score + config.attempt_weight * attempt_ratio;
    round_to(blended, config.precision_decimals)
}

pub fn review_interval_days(attempt_percent: f64, config: &ReviewScheduleConfig) -> u32 {
    config
        .tiers
        .iter()
        .find(|tier| attempt_percent >= tier.min_percent)
        .map(|tier| tier.interval_days)
        .unwrap_or(config.floor_interval_days)
}

/// UTC 下按整日偏移，保留 now 的时刻；超出可表示的时间范围时返回错误
pub fn next_review_at(
    attempt_percent: f64,
    now: DateTime<Utc>,
    config: &ReviewScheduleConfig,
) -> Result<DateTime<Utc>> {
    let days = review_interval_days(attempt_percent, config);
    Duration::try_days(i64::from(days))
        .and_then(|offset| now.checked_add_signed(offset))
        .ok_or_else(|| {
            EngineError::invalid_input(format!(
                "review date {days} days after {now} is out of range"
            ))
        })
}

/// 0-1 分数到 0-4 等级的唯一换算：达到掌握阈值为 4 级，否则 floor(score * 4) 且不超过 3 级
pub fn mastery_level(score: f64, scale: &ScoreScaleConfig) -> u8 {
    if !score.is_finite() || score <= 0.0 {
        return 0;
    }
    if score >= scale.mastered_threshold {
        return MAX_MASTERY_LEVEL;
    }
    let level = (score * f64::from(MAX_MASTERY_LEVEL)).floor() as u8;
    level.min(MAX_UNMASTERED_LEVEL)
}

/// 某等级对应的最低分数，用于把等级阈值换回分数阈值
pub fn level_floor_score(level: u8, scale: &ScoreScaleConfig) -> f64 {
    if level >= MAX_MASTERY_LEVEL {
        scale.mastered_threshold
    } else {
        f64::from(level) / f64::from(MAX_MASTERY_LEVEL)
    }
}

pub fn is_mastered(score: f64, scale: &ScoreScaleConfig) -> bool {
    score >= scale.mastered_threshold
}

/// 一次评分作答后的掌握记录：首次作答直接以得分比例建档，之后按 blend 更新
pub fn record_attempt(
    previous: Option<&MasteryRecord>,
    concept_id: &str,
    attempt_percent: f64,
    now: DateTime<Utc>,
    config: &SchedulerConfig,
) -> Result<MasteryRecord> {
    if concept_id.is_empty() {
        return Err(EngineError::invalid_input("concept id must not be empty"));
    }
    if !attempt_percent.is_finite() || !(0.0..=MAX_ATTEMPT_PERCENT).contains(&attempt_percent) {
        return Err(EngineError::invalid_input(format!(
            "attempt percent must be in [0,100], got {attempt_percent}"
        )));
    }

    let (mastery_score, seen_count) = match previous {
        Some(record) => {
            if record.concept_id != concept_id {
                return Err(EngineError::invalid_input(format!(
                    "mastery record belongs to {}, not {concept_id}",
                    record.concept_id
                )));
            }
            if !record.mastery_score.is_finite() || !(0.0..=1.0).contains(&record.mastery_score) {
                return Err(EngineError::invalid_input(format!(
                    "previous mastery score must be in [0,1], got {}",
                    record.mastery_score
                )));
            }
            (
                blend(record.mastery_score, attempt_percent, &config.blend),
                record.seen_count.saturating_add(1),
            )
        }
        None => (
            round_to(
                attempt_percent / MAX_ATTEMPT_PERCENT,
                config.blend.precision_decimals,
            ),
            1,
        ),
    };

    Ok(MasteryRecord {
        concept_id: concept_id.to_string(),
        mastery_score,
        next_review_at: Some(next_review_at(attempt_percent, now, &config.review)?),
        seen_count,
        updated_at: Some(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 12, 0, 0, 0).unwrap()
    }

    #[test]
    fn blend_matches_reference_pairs() {
        let cfg = BlendConfig::default();
        assert_eq!(blend(0.8, 50.0, &cfg), 0.71);
        assert_eq!(blend(0.2, 90.0, &cfg), 0.41);
    }

    #[test]
    fn single_bad_attempt_does_not_collapse_score() {
        let cfg = BlendConfig::default();
        let after = blend(0.9, 0.0, &cfg);
        assert!(after > 0.6);
    }

    #[test]
    fn interval_table_boundaries() {
        let cfg = ReviewScheduleConfig::default();
        assert_eq!(review_interval_days(100.0, &cfg), 14);
        assert_eq!(review_interval_days(90.0, &cfg), 14);
        assert_eq!(review_interval_days(89.99, &cfg), 7);
        assert_eq!(review_interval_days(70.0, &cfg), 7);
        assert_eq!(review_interval_days(50.0, &cfg), 3);
        assert_eq!(review_interval_days(49.99, &cfg), 1);
        assert_eq!(review_interval_days(0.0, &cfg), 1);
    }

    #[test]
    fn next_review_preserves_time_of_day() {
        let cfg = ReviewScheduleConfig::default();
        let at = Utc.with_ymd_and_hms(2026, 2, 12, 17, 45, 3).unwrap();
        let due = next_review_at(70.0, at, &cfg).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 2, 19, 17, 45, 3).unwrap());
    }

    #[test]
    fn unrepresentable_review_date_is_an_error() {
        let mut cfg = SchedulerConfig::default();
        cfg.review.tiers[0].interval_days = u32::MAX;
        let err = record_attempt(None, "c1", 95.0, now(), &cfg).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let far = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert!(next_review_at(95.0, far, &ReviewScheduleConfig::default()).is_err());
    }

    #[test]
    fn level_conversion_uses_thresholds() {
        let scale = ScoreScaleConfig::default();
        assert_eq!(mastery_level(0.0, &scale), 0);
        assert_eq!(mastery_level(0.24, &scale), 0);
        assert_eq!(mastery_level(0.25, &scale), 1);
        assert_eq!(mastery_level(0.74, &scale), 2);
        assert_eq!(mastery_level(scale.unlock_threshold, &scale), 3);
        assert_eq!(mastery_level(0.94, &scale), 3);
        assert_eq!(mastery_level(scale.mastered_threshold, &scale), 4);
        assert_eq!(mastery_level(f64::NAN, &scale), 0);
        assert_eq!(level_floor_score(3, &scale), scale.unlock_threshold);
        assert_eq!(level_floor_score(4, &scale), scale.mastered_threshold);
    }

    #[test]
    fn first_attempt_seeds_score_from_percent() {
        let cfg = SchedulerConfig::default();
        let record = record_attempt(None, "c1", 83.333, now(), &cfg).unwrap();
        assert_eq!(record.mastery_score, 0.83);
        assert_eq!(record.seen_count, 1);
        assert_eq!(
            record.next_review_at,
            Some(Utc.with_ymd_and_hms(2026, 2, 19, 0, 0, 0).unwrap())
        );
        assert_eq!(record.updated_at, Some(now()));
    }

    #[test]
    fn later_attempts_blend() {
        let cfg = SchedulerConfig::default();
        let previous = MasteryRecord::new("c1", 0.8, None);
        let record = record_attempt(Some(&previous), "c1", 50.0, now(), &cfg).unwrap();
        assert_eq!(record.mastery_score, 0.71);
        assert_eq!(record.seen_count, 2);
    }

    #[test]
    fn invalid_attempts_are_rejected() {
        let cfg = SchedulerConfig::default();
        assert!(record_attempt(None, "c1", 101.0, now(), &cfg).is_err());
        assert!(record_attempt(None, "c1", f64::NAN, now(), &cfg).is_err());
        assert!(record_attempt(None, "", 50.0, now(), &cfg).is_err());

        let bad = MasteryRecord::new("c1", 1.5, None);
        assert!(record_attempt(Some(&bad), "c1", 50.0, now(), &cfg).is_err());

        let other = MasteryRecord::new("c2", 0.5, None);
        assert!(record_attempt(Some(&other), "c1", 50.0, now(), &cfg).is_err());
    }
}
