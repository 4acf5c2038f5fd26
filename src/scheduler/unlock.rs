use std::collections::HashMap;

use crate::scheduler::types::{CurriculumNode, MasteryRecord};

/// 概念 id -> 掌握分数；同一概念出现多行时保留第一行
pub fn mastery_scores(records: &[MasteryRecord]) -> HashMap<&str, f64> {
    let mut scores = HashMap::with_capacity(records.len());
    for record in records {
        scores
            .entry(record.concept_id.as_str())
            .or_insert(record.mastery_score);
    }
    scores
}

pub fn records_by_concept(records: &[MasteryRecord]) -> HashMap<&str, &MasteryRecord> {
    let mut by_concept = HashMap::with_capacity(records.len());
    for record in records {
        by_concept.entry(record.concept_id.as_str()).or_insert(record);
    }
    by_concept
}

/// 解锁判定的唯一实现：无前置概念恒解锁，否则每个前置概念分数都需达到阈值。
/// 缺失的前置概念按 0 分处理。
pub fn is_unlocked_at<T: CurriculumNode + ?Sized>(
    node: &T,
    scores: &HashMap<&str, f64>,
    threshold: f64,
) -> bool {
    node.prerequisite_ids().iter().all(|prerequisite_id| {
        let score = scores.get(prerequisite_id.as_str()).copied().unwrap_or(0.0);
        score >= threshold
    })
}

pub fn is_unlocked<T: CurriculumNode + ?Sized>(
    node: &T,
    scores: &HashMap<&str, f64>,
    scale: &crate::scheduler::config::ScoreScaleConfig,
) -> bool {
    is_unlocked_at(node, scores, scale.unlock_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::config::ScoreScaleConfig;
    use crate::scheduler::types::Concept;

    #[test]
    fn no_prerequisites_is_always_unlocked() {
        let scale = ScoreScaleConfig::default();
        let concept = Concept::new("root");
        assert!(is_unlocked(&concept, &HashMap::new(), &scale));
    }

    #[test]
    fn unlocks_exactly_at_threshold() {
        let scale = ScoreScaleConfig::default();
        let concept = Concept::new("next").with_prerequisites(&["base"]);

        let below = HashMap::from([("base", scale.unlock_threshold - 0.01)]);
        let at = HashMap::from([("base", scale.unlock_threshold)]);

        assert!(!is_unlocked(&concept, &below, &scale));
        assert!(is_unlocked(&concept, &at, &scale));
    }

    #[test]
    fn every_prerequisite_must_be_satisfied() {
        let scale = ScoreScaleConfig::default();
        let concept = Concept::new("c").with_prerequisites(&["a", "b"]);
        let scores = HashMap::from([("a", 1.0), ("b", 0.5)]);
        assert!(!is_unlocked(&concept, &scores, &scale));
    }

    #[test]
    fn missing_prerequisite_counts_as_zero() {
        let concept = Concept::new("c").with_prerequisites(&["ghost"]);
        assert!(!is_unlocked_at(&concept, &HashMap::new(), 0.25));
        // 阈值为 0 时缺失前置也视为满足
        assert!(is_unlocked_at(&concept, &HashMap::new(), 0.0));
    }

    #[test]
    fn nan_score_never_satisfies() {
        let scale = ScoreScaleConfig::default();
        let concept = Concept::new("c").with_prerequisites(&["a"]);
        let scores = HashMap::from([("a", f64::NAN)]);
        assert!(!is_unlocked(&concept, &scores, &scale));
    }

    #[test]
    fn first_row_wins_for_duplicates() {
        let records = vec![
            MasteryRecord::new("a", 0.9, None),
            MasteryRecord::new("a", 0.1, None),
        ];
        assert_eq!(mastery_scores(&records).get("a"), Some(&0.9));
        assert_eq!(records_by_concept(&records)["a"].mastery_score, 0.9);
    }
}
