//! Review queue models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of catalog entity a review item points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Lesson,
    Syllabus,
    Content,
    Question,
}

impl ReviewType {
    pub const ALL: [ReviewType; 4] = [Self::Lesson, Self::Syllabus, Self::Content, Self::Question];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Syllabus => "syllabus",
            Self::Content => "content",
            Self::Question => "question",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lesson" => Some(Self::Lesson),
            "syllabus" => Some(Self::Syllabus),
            "content" => Some(Self::Content),
            "question" => Some(Self::Question),
            _ => None,
        }
    }

    /// Catalog table holding entities of this type
    pub fn table(&self) -> &'static str {
        match self {
            Self::Lesson => "lessons",
            Self::Syllabus => "syllabus",
            Self::Content => "contents",
            Self::Question => "questions",
        }
    }
}

/// Membership of one entity in a user's review queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: i64,
    pub user_id: String,
    pub review_type: ReviewType,
    pub item_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of a bulk add or remove
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// Ids that were added or removed
    pub applied: Vec<i64>,
    /// Ids left untouched (missing entity, already present or absent)
    pub skipped: Vec<i64>,
}

/// Review queue size per type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewCounts {
    pub lesson: i64,
    pub syllabus: i64,
    pub content: i64,
    pub question: i64,
}

impl ReviewCounts {
    pub fn total(&self) -> i64 {
        self.lesson + self.syllabus + self.content + self.question
    }

    pub(crate) fn set(&mut self, review_type: ReviewType, count: i64) {
        match review_type {
            ReviewType::Lesson => self.lesson = count,
            ReviewType::Syllabus => self.syllabus = count,
            ReviewType::Content => self.content = count,
            ReviewType::Question => self.question = count,
        }
    }
}
