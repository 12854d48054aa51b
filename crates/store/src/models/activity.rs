//! Activity ledger models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    View,
    QuizAttempt,
    Completion,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::QuizAttempt => "quiz_attempt",
            Self::Completion => "completion",
        }
    }

    /// Parse an activity kind, ignoring ASCII case
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "view" => Some(Self::View),
            "quiz_attempt" => Some(Self::QuizAttempt),
            "completion" => Some(Self::Completion),
            _ => None,
        }
    }
}

/// One immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: String,
    pub lesson_id: Option<i64>,
    pub content_id: Option<i64>,
    #[serde(rename = "activity_type")]
    pub kind: ActivityKind,
    /// Duration in seconds, when known
    pub time_spent: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

/// New ledger entry
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub lesson_id: Option<i64>,
    pub content_id: Option<i64>,
    pub time_spent: Option<i64>,
}

impl NewActivity {
    pub fn new(kind: ActivityKind) -> Self {
        Self {
            kind,
            lesson_id: None,
            content_id: None,
            time_spent: None,
        }
    }

    pub fn lesson(mut self, lesson_id: i64) -> Self {
        self.lesson_id = Some(lesson_id);
        self
    }

    pub fn content(mut self, content_id: i64) -> Self {
        self.content_id = Some(content_id);
        self
    }

    pub fn duration(mut self, seconds: i64) -> Self {
        self.time_spent = Some(seconds);
        self
    }
}

/// Ledger listing filter; date bounds are inclusive
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub kind: Option<ActivityKind>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
