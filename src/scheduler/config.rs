use serde::{Deserialize, Serialize};

use crate::constants::MAX_REVIEW_INTERVAL_DAYS;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreScaleConfig {
    /// 前置概念达到该分数后，依赖它的概念才会解锁（四级刻度中的第 3 级）
    pub unlock_threshold: f64,
    /// 达到该分数视为已掌握；必须严格高于解锁阈值
    pub mastered_threshold: f64,
}

impl Default for ScoreScaleConfig {
    fn default() -> Self {
        Self {
            unlock_threshold: 0.75,
            mastered_threshold: 0.95,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendConfig {
    pub previous_weight: f64,
    pub attempt_weight: f64,
    #[serde(default = "default_precision_decimals")]
    pub precision_decimals: u32,
}

fn default_precision_decimals() -> u32 {
    2
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            previous_weight: 0.7,
            attempt_weight: 0.3,
            precision_decimals: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewTier {
    pub min_percent: f64,
    pub interval_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewScheduleConfig {
    /// 自上而下匹配，首个 `percent >= min_percent` 的档位生效
    pub tiers: Vec<ReviewTier>,
    /// 未命中任何档位时的复习间隔
    pub floor_interval_days: u32,
}

impl Default for ReviewScheduleConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                ReviewTier {
                    min_percent: 90.0,
                    interval_days: 14,
                },
                ReviewTier {
                    min_percent: 70.0,
                    interval_days: 7,
                },
                ReviewTier {
                    min_percent: 50.0,
                    interval_days: 3,
                },
            ],
            floor_interval_days: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackWeight {
    pub track: String,
    pub weight: f64,
}

impl TrackWeight {
    pub fn new(track: &str, weight: f64) -> Self {
        Self {
            track: track.to_string(),
            weight,
        }
    }
}

fn default_track_weights() -> Vec<TrackWeight> {
    vec![
        TrackWeight::new("LLM_APP", 0.7),
        TrackWeight::new("CORE_TECH", 0.3),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub min_questions: u32,
    pub max_questions: u32,
    pub target_questions: u32,
    pub max_review_concepts: usize,
    /// 新概念至少分配的题目数
    #[serde(default = "default_min_new_concept_questions")]
    pub min_new_concept_questions: u32,
    /// 每个复习概念从新概念预算中扣除的题目数
    #[serde(default = "default_questions_per_review")]
    pub questions_per_review: u32,
    /// 计划器使用的简化解锁条件：前置概念达到的最低等级
    #[serde(default = "default_prerequisite_level")]
    pub prerequisite_level: u8,
    #[serde(default = "default_track_weights")]
    pub track_weights: Vec<TrackWeight>,
}

fn default_min_new_concept_questions() -> u32 {
    4
}
fn default_questions_per_review() -> u32 {
    2
}
fn default_prerequisite_level() -> u8 {
    1
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_questions: 6,
            max_questions: 10,
            target_questions: 8,
            max_review_concepts: 2,
            min_new_concept_questions: 4,
            questions_per_review: 2,
            prerequisite_level: 1,
            track_weights: default_track_weights(),
        }
    }
}

impl PlannerConfig {
    pub fn total_questions(&self) -> u32 {
        self.min_questions
            .max(self.target_questions.min(self.max_questions))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    #[serde(default)]
    pub scale: ScoreScaleConfig,
    #[serde(default)]
    pub blend: BlendConfig,
    #[serde(default)]
    pub review: ReviewScheduleConfig,
    #[serde(default)]
    pub planner: PlannerConfig,
}

impl SchedulerConfig {
    pub fn from_env(env_config: &crate::config::EngineEnvConfig) -> Self {
        let mut config = Self::default();
        if let Some(v) = env_config.unlock_threshold {
            config.scale.unlock_threshold = v;
        }
        if let Some(v) = env_config.mastered_threshold {
            config.scale.mastered_threshold = v;
        }
        if let Some(v) = env_config.planner_target_questions {
            config.planner.target_questions = v;
        }
        if let Some(v) = env_config.planner_max_review_concepts {
            config.planner.max_review_concepts = v;
        }
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        // ScoreScaleConfig
        if !self.scale.unlock_threshold.is_finite() || self.scale.unlock_threshold <= 0.0 {
            return Err("scale.unlock_threshold must be > 0".to_string());
        }
        if self.scale.mastered_threshold > 1.0 {
            return Err("scale.mastered_threshold must be <= 1".to_string());
        }
        if !(self.scale.mastered_threshold > self.scale.unlock_threshold) {
            return Err("scale.mastered_threshold must be > scale.unlock_threshold".to_string());
        }

        // BlendConfig
        if !(0.0..=1.0).contains(&self.blend.previous_weight) {
            return Err("blend.previous_weight must be in [0,1]".to_string());
        }
        if !(0.0..=1.0).contains(&self.blend.attempt_weight) {
            return Err("blend.attempt_weight must be in [0,1]".to_string());
        }
        let weight_sum = self.blend.previous_weight + self.blend.attempt_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(format!(
                "blend weights must sum to 1.0 (got {weight_sum:.3})"
            ));
        }
        if self.blend.precision_decimals > 6 {
            return Err("blend.precision_decimals must be <= 6".to_string());
        }

        // ReviewScheduleConfig
        if self.review.floor_interval_days == 0 {
            return Err("review.floor_interval_days must be >= 1".to_string());
        }
        if self.review.floor_interval_days > MAX_REVIEW_INTERVAL_DAYS
            || self
                .review
                .tiers
                .iter()
                .any(|tier| tier.interval_days > MAX_REVIEW_INTERVAL_DAYS)
        {
            return Err(format!(
                "review intervals must be <= {MAX_REVIEW_INTERVAL_DAYS} days"
            ));
        }
        for pair in self.review.tiers.windows(2) {
            if !(pair[0].min_percent > pair[1].min_percent) {
                return Err("review.tiers must be strictly descending by min_percent".to_string());
            }
            if pair[0].interval_days < pair[1].interval_days {
                return Err("review.tiers intervals must not increase down the table".to_string());
            }
        }
        for tier in &self.review.tiers {
            if !(0.0..=100.0).contains(&tier.min_percent) {
                return Err("review.tiers min_percent must be in [0,100]".to_string());
            }
            if tier.interval_days < self.review.floor_interval_days {
                return Err(
                    "review.tiers interval_days must be >= review.floor_interval_days".to_string(),
                );
            }
        }

        // PlannerConfig
        if self.planner.min_questions == 0 {
            return Err("planner.min_questions must be > 0".to_string());
        }
        if self.planner.min_questions > self.planner.max_questions {
            return Err("planner.min_questions must be <= planner.max_questions".to_string());
        }
        if self.planner.prerequisite_level > crate::constants::MAX_MASTERY_LEVEL {
            return Err("planner.prerequisite_level must be <= 4".to_string());
        }
        if self
            .planner
            .track_weights
            .iter()
            .any(|w| !w.weight.is_finite() || w.weight < 0.0)
        {
            return Err("planner.track_weights must be finite and >= 0".to_string());
        }

        Ok(())
    }
}
