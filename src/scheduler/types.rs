use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 图排序与解锁判定所需的最小节点视图
pub trait CurriculumNode {
    fn id(&self) -> &str;
    fn prerequisite_ids(&self) -> &[String];

    /// 课程顺序的平局键；无时间戳的节点排在有时间戳的之后
    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// 主题分组，仅用于每日新概念的加权偏好
    #[serde(default)]
    pub track: Option<String>,
    #[serde(default)]
    pub prerequisite_ids: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Concept {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            difficulty: Difficulty::default(),
            track: None,
            prerequisite_ids: Vec::new(),
            created_at: None,
        }
    }

    pub fn with_prerequisites(mut self, prerequisite_ids: &[&str]) -> Self {
        self.prerequisite_ids = prerequisite_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_track(mut self, track: &str) -> Self {
        self.track = Some(track.to_string());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

impl CurriculumNode for Concept {
    fn id(&self) -> &str {
        &self.id
    }

    fn prerequisite_ids(&self) -> &[String] {
        &self.prerequisite_ids
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteEdge {
    pub concept_id: String,
    pub prerequisite_concept_id: String,
}

/// 用户在单个概念上的掌握状态，首次作答时创建，此后只更新不删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub concept_id: String,
    pub mastery_score: f64,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub seen_count: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    pub fn new(concept_id: &str, mastery_score: f64, next_review_at: Option<DateTime<Utc>>) -> Self {
        Self {
            concept_id: concept_id.to_string(),
            mastery_score,
            next_review_at,
            seen_count: 1,
            updated_at: None,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    DueReview,
    NewConcept,
    Fallback,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DueReview => "due_review",
            Self::NewConcept => "new_concept",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub concept_id: String,
    pub source: SelectionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptStatus {
    Locked,
    Available,
    #[serde(rename = "In Review")]
    InReview,
    Mastered,
}

impl ConceptStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked => "Locked",
            Self::Available => "Available",
            Self::InReview => "In Review",
            Self::Mastered => "Mastered",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    pub concept_id: String,
    pub title: String,
    pub track: Option<String>,
    pub prerequisite_ids: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub status: ConceptStatus,
    pub mastery_score: Option<f64>,
    pub mastery_level: u8,
    pub next_review_at: Option<DateTime<Utc>>,
    pub unlocked: bool,
    pub mastered: bool,
    pub due: bool,
}

impl StatusEntry {
    /// 手动指定学习概念前的准入判断：已解锁或已掌握
    pub fn is_selectable(&self) -> bool {
        self.unlocked || self.mastered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationKind {
    New,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAllocation {
    pub concept_id: String,
    pub question_count: u32,
    pub kind: AllocationKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySessionPlan {
    /// YYYY-MM-DD (UTC)
    pub date: String,
    pub new_concept_id: Option<String>,
    pub review_concept_ids: Vec<String>,
    pub allocations: Vec<QuestionAllocation>,
    pub total_questions: u32,
}

impl DailySessionPlan {
    pub fn allocated_questions(&self) -> u32 {
        self.allocations.iter().map(|a| a.question_count).sum()
    }
}
